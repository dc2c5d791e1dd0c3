//! 课程后台任务记录存储操作

use super::SeaOrmStorage;
use crate::entity::course_tasks::{ActiveModel, Entity as CourseTasks};
use crate::errors::{CourseTaskError, Result};
use crate::models::course_tasks::{
    entities::{CourseTask, TaskState},
    requests::CreateCourseTaskRequest,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 创建任务记录（初始状态为 PENDING）
    pub async fn create_course_task_impl(&self, req: CreateCourseTaskRequest) -> Result<CourseTask> {
        let now = chrono::Utc::now().timestamp();
        let task_input = serde_json::to_string(&req.task_input)?;

        let model = ActiveModel {
            task_type: Set(req.task_type.to_string()),
            course_id: Set(req.course_id),
            task_key: Set(req.task_key),
            task_input: Set(task_input),
            task_id: Set(None),
            task_state: Set(TaskState::Pending.to_string()),
            task_output: Set(None),
            requester_id: Set(req.requester_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| CourseTaskError::database_operation(format!("创建任务记录失败: {e}")))?;

        Ok(result.into_course_task())
    }

    /// 通过 ID 获取任务记录
    pub async fn get_course_task_by_id_impl(&self, id: i64) -> Result<Option<CourseTask>> {
        let result = CourseTasks::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseTaskError::database_operation(format!("查询任务记录失败: {e}")))?;

        Ok(result.map(|m| m.into_course_task()))
    }

    /// 保存任务记录，不参与外层事务，立即提交
    pub async fn update_course_task_impl(&self, task: &CourseTask) -> Result<CourseTask> {
        let model = ActiveModel {
            id: Set(task.id),
            task_id: Set(task.task_id.clone()),
            task_state: Set(task.task_state.to_string()),
            task_output: Set(task.task_output.clone()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                CourseTaskError::not_found(format!("任务记录 {} 不存在", task.id))
            }
            e => CourseTaskError::database_operation(format!("更新任务记录失败: {e}")),
        })?;

        Ok(result.into_course_task())
    }
}
