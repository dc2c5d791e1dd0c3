pub mod course_tasks;
pub mod rubrics;

pub use course_tasks::CourseTaskService;
pub use rubrics::RubricEngine;
