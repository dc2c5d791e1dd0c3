use serde_json::{Value, json};
use tracing::warn;

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

/// 将作答次数重置为 0，次数已为 0 时不写库，但仍视为已处理
pub struct ResetAttemptsUpdater;

#[async_trait::async_trait]
impl ModuleStateUpdater for ResetAttemptsUpdater {
    fn action_name(&self) -> &'static str {
        "reset"
    }

    async fn update(
        &self,
        service: &CourseTaskService,
        _descriptor: &ModuleDescriptor,
        module: &StudentModule,
        args: &TaskInstanceArgs,
    ) -> Result<UpdateOutcome> {
        let mut state = module.parsed_state()?;
        let Some(old_attempts) = state.get("attempts").cloned() else {
            return Ok(UpdateOutcome::Updated);
        };
        match attempt_count(&old_attempts) {
            Some(count) if count > 0.0 => {}
            Some(_) => return Ok(UpdateOutcome::Updated),
            None => {
                warn!(
                    "module {} of student {} has unreadable attempts {}, left unchanged",
                    module.id, module.student_id, old_attempts
                );
                return Ok(UpdateOutcome::Updated);
            }
        }

        state.insert("attempts".to_string(), json!(0));
        let state = serde_json::to_string(&state)?;
        service
            .storage()
            .update_student_module_state(module.id, &state)
            .await?;

        let username = service.student_username(module.student_id).await?;
        service.tracker().track(
            &args.request_info,
            &TaskInfo::new(username, args),
            "problem_reset_attempts",
            json!({ "old_attempts": old_attempts, "new_attempts": 0 }),
            TASK_TRACK_PAGE,
        );

        Ok(UpdateOutcome::Updated)
    }
}

/// 作答次数可能以整数、浮点数或数字字符串保存；null 视为 0
fn attempt_count(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub async fn reset_problem_attempts(
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
        &ResetAttemptsUpdater,
        args,
    )
    .await
}
