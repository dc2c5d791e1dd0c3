//! 数据模型定义

pub mod course_tasks;
pub mod rubrics;
pub mod student_modules;
pub mod users;
