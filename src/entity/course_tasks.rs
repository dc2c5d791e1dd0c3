//! 课程后台任务记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_type: String,
    pub course_id: String,
    pub task_key: String,
    #[sea_orm(column_type = "Text")]
    pub task_input: String,
    pub task_id: Option<String>,
    pub task_state: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub task_output: Option<String>,
    pub requester_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_course_task(self) -> crate::models::course_tasks::entities::CourseTask {
        use crate::models::course_tasks::entities::{CourseTask, CourseTaskType, TaskState};
        use chrono::{DateTime, Utc};

        CourseTask {
            id: self.id,
            task_type: self
                .task_type
                .parse::<CourseTaskType>()
                .unwrap_or(CourseTaskType::RescoreProblem),
            course_id: self.course_id,
            task_key: self.task_key,
            task_input: self.task_input,
            task_id: self.task_id,
            task_state: self
                .task_state
                .parse::<TaskState>()
                .unwrap_or(TaskState::Pending),
            task_output: self.task_output,
            requester_id: self.requester_id,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
