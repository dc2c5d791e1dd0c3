use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::models::{
    course_tasks::{entities::CourseTask, requests::CreateCourseTaskRequest},
    student_modules::{
        entities::StudentModule,
        requests::{CreateStudentModuleRequest, StudentModuleQuery},
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod memory_storage;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// 学生模块状态方法
    // 创建学生模块状态
    async fn create_student_module(&self, req: CreateStudentModuleRequest)
    -> Result<StudentModule>;
    // 通过ID获取学生模块状态
    async fn get_student_module_by_id(&self, id: i64) -> Result<Option<StudentModule>>;
    // 统计符合条件的学生模块状态
    async fn count_student_modules(&self, query: &StudentModuleQuery) -> Result<u64>;
    // 列出符合条件的学生模块状态（按 ID 升序）
    async fn list_student_modules(&self, query: &StudentModuleQuery) -> Result<Vec<StudentModule>>;
    // 更新作答状态（单独事务提交）
    async fn update_student_module_state(&self, id: i64, state: &str) -> Result<bool>;
    // 删除学生模块状态（单独事务提交）
    async fn delete_student_module(&self, id: i64) -> Result<bool>;

    /// 课程后台任务方法
    // 创建任务记录
    async fn create_course_task(&self, req: CreateCourseTaskRequest) -> Result<CourseTask>;
    // 通过ID获取任务记录
    async fn get_course_task_by_id(&self, id: i64) -> Result<Option<CourseTask>>;
    // 保存任务记录的 task_id、状态和输出（立即提交）
    async fn update_course_task(&self, task: &CourseTask) -> Result<CourseTask>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let config = AppConfig::get();
    if config.uses_memory_storage() {
        warn!("Using in-memory storage, data will be lost on exit");
        return Ok(Arc::new(memory_storage::MemoryStorage::new()));
    }
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
