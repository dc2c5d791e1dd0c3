//! 学生模块状态实体
//!
//! 每个 (课程, 题目, 学生) 一行，保存序列化的作答状态。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_modules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: String,
    pub module_state_key: String,
    pub student_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub state: Option<String>,
    pub grade: Option<f64>,
    pub max_grade: Option<f64>,
    pub created_at: i64,
    pub modified_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student_module(self) -> crate::models::student_modules::entities::StudentModule {
        use crate::models::student_modules::entities::StudentModule;
        use chrono::{DateTime, Utc};

        StudentModule {
            id: self.id,
            course_id: self.course_id,
            module_state_key: self.module_state_key,
            student_id: self.student_id,
            state: self.state,
            grade: self.grade,
            max_grade: self.max_grade,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            modified_at: DateTime::<Utc>::from_timestamp(self.modified_at, 0).unwrap_or_default(),
        }
    }
}
