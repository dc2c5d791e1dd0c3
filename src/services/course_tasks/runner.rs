//! 批量更新任务的执行流程
//!
//! 任务记录状态：`PENDING → PROGRESS → SUCCESS | FAILURE`。
//! 任务记录和每条学生记录的写入都单独提交，失败时已处理的记录不会回滚。

use std::backtrace::{Backtrace, BacktraceStatus};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::CourseTaskService;
use super::updater::{ModuleStateUpdater, UpdateOutcome};
use crate::errors::{CourseTaskError, Result};
use crate::models::course_tasks::{
    entities::TaskState,
    requests::TaskInstanceArgs,
    responses::{TaskFailure, TaskProgress},
};
use crate::models::student_modules::requests::StudentModuleQuery;
use crate::models::users::entities::{StudentIdentifier, User};
use crate::utils::truncate_chars;

/// 执行批量更新并维护任务记录
///
/// 任务记录不存在、学生不存在时直接返回错误，不写失败记录；
/// 之后的任何错误都会写入 FAILURE 状态后原样返回。
#[allow(clippy::too_many_arguments)]
pub async fn update_problem_module_state(
    service: &CourseTaskService,
    task_id: &str,
    entry_id: i64,
    course_id: &str,
    problem_key: &str,
    student_ident: Option<&str>,
    updater: &dyn ModuleStateUpdater,
    mut args: TaskInstanceArgs,
) -> Result<TaskProgress> {
    let action_name = updater.action_name();
    info!(
        "Starting to update problem modules as task \"{}\": course \"{}\" problem \"{}\": nothing {} yet",
        task_id, course_id, problem_key, action_name
    );

    let storage = service.storage();
    let mut entry = storage
        .get_course_task_by_id(entry_id)
        .await?
        .ok_or_else(|| CourseTaskError::not_found(format!("任务记录 {entry_id} 不存在")))?;
    entry.task_id = Some(task_id.to_string());
    entry.task_state = TaskState::Progress;
    let mut entry = storage.update_course_task(&entry).await?;

    // 写入任务 ID，跟踪事件中使用
    args.task_id = Some(task_id.to_string());

    let student = match student_ident {
        Some(ident) => Some(resolve_student(service, ident).await?),
        None => None,
    };

    match perform_module_state_update(
        service,
        task_id,
        course_id,
        problem_key,
        student.as_ref(),
        updater,
        &args,
    )
    .await
    {
        Ok(progress) => {
            entry.task_output = Some(serde_json::to_string(&progress)?);
            entry.task_state = TaskState::Success;
            storage.update_course_task(&entry).await?;

            info!(
                "Finishing task \"{}\": course \"{}\" problem \"{}\": final: {:?}",
                task_id, course_id, problem_key, progress
            );
            Ok(progress)
        }
        Err(err) => {
            let failure = failure_output(&err, service.traceback_limit());
            warn!(
                "background task ({}) failed: {} {}",
                task_id,
                err,
                failure.traceback.as_deref().unwrap_or_default()
            );

            match serde_json::to_string(&failure) {
                Ok(output) => entry.task_output = Some(output),
                Err(e) => error!("Failed to serialize failure of task {}: {}", task_id, e),
            }
            entry.task_state = TaskState::Failure;
            if let Err(save_err) = storage.update_course_task(&entry).await {
                error!(
                    "Failed to record failure of task {} on entry {}: {}",
                    task_id, entry_id, save_err
                );
            }
            Err(err)
        }
    }
}

/// 按条件逐条处理学生模块状态，返回最终进度
pub async fn perform_module_state_update(
    service: &CourseTaskService,
    task_id: &str,
    course_id: &str,
    problem_key: &str,
    student: Option<&User>,
    updater: &dyn ModuleStateUpdater,
    args: &TaskInstanceArgs,
) -> Result<TaskProgress> {
    let start = Utc::now();

    let descriptor = service
        .module_store()
        .get_instance(course_id, problem_key)
        .await?;

    let query = StudentModuleQuery::new(course_id, problem_key)
        .with_student(student.map(|s| s.id))
        .with_state_filter(updater.state_filter());

    let storage = service.storage();
    let total = storage.count_student_modules(&query).await?;
    let modules = storage.list_student_modules(&query).await?;

    let mut attempted = 0u64;
    let mut updated = 0u64;
    let snapshot = |attempted: u64, updated: u64| TaskProgress {
        action_name: updater.action_name().to_string(),
        attempted,
        updated,
        total,
        duration_ms: (Utc::now() - start).num_milliseconds(),
    };

    let mut progress = snapshot(attempted, updated);
    service.progress_reporter().report(task_id, &progress);

    for module in &modules {
        attempted += 1;
        match updater.update(service, &descriptor, module, args).await? {
            UpdateOutcome::Updated => updated += 1,
            UpdateOutcome::Skipped => {
                debug!(
                    "module {} of student {} skipped by {}",
                    module.id,
                    module.student_id,
                    updater.action_name()
                );
            }
        }

        progress = snapshot(attempted, updated);
        service.progress_reporter().report(task_id, &progress);
    }

    Ok(progress)
}

/// 按用户名或邮箱查找学生
async fn resolve_student(service: &CourseTaskService, ident: &str) -> Result<User> {
    let identifier = StudentIdentifier::parse(ident);
    let user = match &identifier {
        StudentIdentifier::Email(email) => service.storage().get_user_by_email(email).await?,
        StudentIdentifier::Username(name) => service.storage().get_user_by_username(name).await?,
    };
    user.ok_or_else(|| CourseTaskError::not_found(format!("找不到学生: {identifier}")))
}

/// 生成失败记录
///
/// 堆栈信息以错误代码和类型开头，不依赖 `RUST_BACKTRACE`，
/// 无法获取调用栈时只保留第一行。
fn failure_output(err: &CourseTaskError, traceback_limit: usize) -> TaskFailure {
    let mut traceback = format!("{} {}: {}", err.code(), err.error_type(), err.message());
    let backtrace = Backtrace::force_capture();
    if backtrace.status() == BacktraceStatus::Captured {
        traceback.push('\n');
        traceback.push_str(&backtrace.to_string());
    }

    TaskFailure {
        exception: err.variant_name().to_string(),
        message: err.message().to_string(),
        traceback: Some(truncate_chars(&traceback, traceback_limit)),
    }
}
