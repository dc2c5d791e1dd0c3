use serde_json::json;

use super::courseware::ModuleDescriptor;
use super::runner::update_problem_module_state;
use super::tracking::{TASK_TRACK_PAGE, TaskInfo};
use super::updater::{ModuleStateUpdater, UpdateOutcome};
use super::{CourseTaskService, required_problem_url};
use crate::errors::Result;
use crate::models::course_tasks::{
    requests::{TaskInput, TaskInstanceArgs},
    responses::TaskProgress,
};
use crate::models::student_modules::entities::StudentModule;

/// 删除学生的作答状态
pub struct DeleteStateUpdater;

#[async_trait::async_trait]
impl ModuleStateUpdater for DeleteStateUpdater {
    fn action_name(&self) -> &'static str {
        "deleted"
    }

    async fn update(
        &self,
        service: &CourseTaskService,
        _descriptor: &ModuleDescriptor,
        module: &StudentModule,
        args: &TaskInstanceArgs,
    ) -> Result<UpdateOutcome> {
        let username = service.student_username(module.student_id).await?;
        service.storage().delete_student_module(module.id).await?;

        service.tracker().track(
            &args.request_info,
            &TaskInfo::new(username, args),
            "problem_delete_state",
            json!({}),
            TASK_TRACK_PAGE,
        );

        Ok(UpdateOutcome::Updated)
    }
}

pub async fn delete_problem_state(
    service: &CourseTaskService,
    task_id: &str,
    entry_id: i64,
    course_id: &str,
    task_input: &TaskInput,
    args: TaskInstanceArgs,
) -> Result<TaskProgress> {
    let problem_url = required_problem_url(task_input)?;
    update_problem_module_state(
        service,
        task_id,
        entry_id,
        course_id,
        problem_url,
        None,
        &DeleteStateUpdater,
        args,
    )
    .await
}
