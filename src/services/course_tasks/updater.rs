use super::CourseTaskService;
use super::courseware::ModuleDescriptor;
use crate::errors::Result;
use crate::models::course_tasks::requests::TaskInstanceArgs;
use crate::models::student_modules::{entities::StudentModule, requests::ModuleStateFilter};

/// 单条记录的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    // 记录已处理，计入 updated
    Updated,
    // 本条失败但不影响后续记录
    Skipped,
}

/// 逐条更新学生模块状态的策略
///
/// 返回 `Err` 表示致命错误，整个任务立即终止，后续记录不再处理。
#[async_trait::async_trait]
pub trait ModuleStateUpdater: Send + Sync {
    /// 过去式动词，写入进度和任务输出
    fn action_name(&self) -> &'static str;

    /// 额外的候选记录过滤条件
    fn state_filter(&self) -> Option<ModuleStateFilter> {
        None
    }

    async fn update(
        &self,
        service: &CourseTaskService,
        descriptor: &ModuleDescriptor,
        module: &StudentModule,
        args: &TaskInstanceArgs,
    ) -> Result<UpdateOutcome>;
}
