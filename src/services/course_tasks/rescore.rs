use serde_json::Value;
use tracing::{debug, warn};

use super::courseware::{ModuleDescriptor, ModuleInstanceRequest};
use super::runner::update_problem_module_state;
use super::tracking::{TaskInfo, make_track_function};
use super::updater::{ModuleStateUpdater, UpdateOutcome};
use super::{CourseTaskService, required_problem_url};
use crate::errors::{CourseTaskError, Result};
use crate::models::course_tasks::{
    requests::{TaskInput, TaskInstanceArgs},
    responses::TaskProgress,
};
use crate::models::student_modules::{entities::StudentModule, requests::ModuleStateFilter};

/// 重新评分
///
/// 只处理已提交（`"done": true`）的记录。题目实例无法创建或不支持重新评分时，
/// 后续学生也不会成功，因此作为致命错误终止任务。
pub struct RescoreUpdater;

#[async_trait::async_trait]
impl ModuleStateUpdater for RescoreUpdater {
    fn action_name(&self) -> &'static str {
        "rescored"
    }

    fn state_filter(&self) -> Option<ModuleStateFilter> {
        Some(ModuleStateFilter::Done)
    }

    async fn update(
        &self,
        service: &CourseTaskService,
        descriptor: &ModuleDescriptor,
        module: &StudentModule,
        args: &TaskInstanceArgs,
    ) -> Result<UpdateOutcome> {
        let course_id = module.course_id.as_str();
        let location = module.module_state_key.as_str();

        let student = service
            .storage()
            .get_user_by_id(module.student_id)
            .await?
            .ok_or_else(|| {
                CourseTaskError::update_problem_module_state(format!(
                    "No student {} for module {location}",
                    module.student_id
                ))
            })?;

        let track_function = make_track_function(
            service.tracker().clone(),
            args.request_info.clone(),
            TaskInfo::new(student.username.as_str(), args),
        );
        let instance = service
            .module_system()
            .get_module_for_descriptor(ModuleInstanceRequest {
                course_id,
                student: &student,
                descriptor,
                grade_bucket_type: Some("rescore"),
                xqueue_callback_url_prefix: &args.xqueue_callback_url_prefix,
                track_function,
            })
            .await?;

        let Some(mut instance) = instance else {
            let message = format!(
                "No module {location} for student {}--access denied?",
                student.username
            );
            debug!("{}", message);
            return Err(CourseTaskError::update_problem_module_state(message));
        };

        if !instance.supports_rescoring() {
            return Err(CourseTaskError::update_problem_module_state(
                "Specified problem does not support rescoring.",
            ));
        }

        let result = instance.rescore_problem().await?;
        match result.get("success") {
            None => {
                let response = Value::Object(result.clone());
                warn!(
                    "error processing rescore call for course {}, problem {} and student {}: unexpected response {}",
                    course_id,
                    location,
                    student.username,
                    response
                );
                Ok(UpdateOutcome::Skipped)
            }
            Some(Value::String(outcome)) if outcome == "correct" || outcome == "incorrect" => {
                debug!(
                    "successfully processed rescore call for course {}, problem {} and student {}: {}",
                    course_id, location, student.username, outcome
                );
                Ok(UpdateOutcome::Updated)
            }
            Some(other) => {
                warn!(
                    "error processing rescore call for course {}, problem {} and student {}: {}",
                    course_id, location, student.username, other
                );
                Ok(UpdateOutcome::Skipped)
            }
        }
    }
}

pub async fn rescore_problem(
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
        task_input.student.as_deref(),
        &RescoreUpdater,
        args,
    )
    .await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::course_tasks::entities::{CourseTaskType, TaskState};
    use crate::models::course_tasks::responses::TaskFailure;
    use crate::services::course_tasks::testing::{Fixture, ModuleBehavior};

    fn input() -> TaskInput {
        TaskInput::for_problem(Fixture::PROBLEM)
    }

    #[tokio::test]
    async fn test_rescore_only_done_modules() {
        let fixture = Fixture::with_students(3).await;
        let late = fixture.add_student("late").await;
        fixture.add_module(&late, Some(r#"{"attempts": 1}"#)).await;
        let entry = fixture.entry(CourseTaskType::RescoreProblem).await;

        let progress = fixture
            .service
            .rescore_problem("task", entry.id, Fixture::COURSE, &input(), TaskInstanceArgs::default())
            .await
            .unwrap();
        assert_eq!(progress.action_name, "rescored");
        assert_eq!(progress.total, 3);
        assert_eq!(progress.updated, 3);

        let calls = fixture.module_system.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(_, bucket)| bucket.as_deref() == Some("rescore")));
    }

    #[tokio::test]
    async fn test_unrecognized_result_is_skipped() {
        let fixture = Fixture::with_students(3).await;
        fixture
            .module_system
            .set_response("student0", json!({"success": "error"}));
        fixture.module_system.set_response("student1", json!({}));
        let entry = fixture.entry(CourseTaskType::RescoreProblem).await;

        let progress = fixture
            .service
            .rescore_problem("task", entry.id, Fixture::COURSE, &input(), TaskInstanceArgs::default())
            .await
            .unwrap();
        assert_eq!(progress.attempted, 3);
        assert_eq!(progress.updated, 1);
    }

    #[tokio::test]
    async fn test_access_denied_is_fatal() {
        let fixture = Fixture::with_students(3).await;
        fixture.module_system.set_behavior(ModuleBehavior::Denied);
        let entry = fixture.entry(CourseTaskType::RescoreProblem).await;

        let err = fixture
            .service
            .rescore_problem("task", entry.id, Fixture::COURSE, &input(), TaskInstanceArgs::default())
            .await
            .unwrap_err();
        assert_eq!(err.variant_name(), "UpdateProblemModuleState");
        assert!(err.message().contains("access denied?"));
        assert_eq!(fixture.module_system.calls().len(), 1);

        let stored = fixture.stored_entry(entry.id).await;
        assert_eq!(stored.task_state, TaskState::Failure);
        let failure: TaskFailure =
            serde_json::from_str(stored.task_output.as_deref().unwrap()).unwrap();
        assert_eq!(failure.exception, "UpdateProblemModuleState");
    }

    #[tokio::test]
    async fn test_not_rescorable_is_fatal() {
        let fixture = Fixture::with_students(2).await;
        fixture.module_system.set_behavior(ModuleBehavior::NotRescorable);
        let entry = fixture.entry(CourseTaskType::RescoreProblem).await;

        let err = fixture
            .service
            .rescore_problem("task", entry.id, Fixture::COURSE, &input(), TaskInstanceArgs::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Specified problem does not support rescoring.");
    }

    #[tokio::test]
    async fn test_single_student_by_email_and_tracking() {
        let fixture = Fixture::with_students(3).await;
        let entry = fixture.entry(CourseTaskType::RescoreProblem).await;
        let mut args = TaskInstanceArgs::default();
        args.request_info.insert("host".into(), json!("lms.example.com"));

        let progress = fixture
            .service
            .rescore_problem(
                "task-rescore",
                entry.id,
                Fixture::COURSE,
                &input().with_student("student2@example.com"),
                args,
            )
            .await
            .unwrap();
        assert_eq!(progress.total, 1);
        assert_eq!(progress.updated, 1);

        let events = fixture.tracker.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "problem_rescore");
        assert_eq!(events[0].student, "student2");
        assert_eq!(events[0].task_id, "task-rescore");
        assert_eq!(events[0].request_info["host"], "lms.example.com");
    }
}
