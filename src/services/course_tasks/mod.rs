//! 课程后台任务：对某道题目的全部学生状态批量执行重新评分、重置作答次数或删除状态
//!
//! - `runner`: 任务记录维护与逐条处理循环
//! - `rescore` / `reset_attempts` / `delete_state`: 三种更新策略及对应的任务入口
//! - `courseware` / `tracking` / `progress`: 外部协作方接口

pub mod courseware;
pub mod delete_state;
pub mod progress;
pub mod rescore;
pub mod reset_attempts;
pub mod runner;
pub mod tracking;
pub mod updater;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{CourseTaskError, Result};
use crate::models::course_tasks::{
    entities::CourseTaskType,
    requests::{TaskInput, TaskInstanceArgs},
    responses::TaskProgress,
};
use crate::storage::Storage;

use courseware::{ModuleStore, ModuleSystem};
use progress::{LogProgressReporter, ProgressReporter};
use tracking::{LogTracker, Tracker};

pub use tracking::{TASK_TRACK_PAGE, UNKNOWN_TASK_ID};
pub use updater::{ModuleStateUpdater, UpdateOutcome};

#[derive(Clone)]
pub struct CourseTaskService {
    storage: Arc<dyn Storage>,
    module_store: Arc<dyn ModuleStore>,
    module_system: Arc<dyn ModuleSystem>,
    tracker: Arc<dyn Tracker>,
    progress: Arc<dyn ProgressReporter>,
    traceback_limit: usize,
}

impl CourseTaskService {
    pub fn new(
        storage: Arc<dyn Storage>,
        module_store: Arc<dyn ModuleStore>,
        module_system: Arc<dyn ModuleSystem>,
    ) -> Self {
        Self {
            storage,
            module_store,
            module_system,
            tracker: Arc::new(LogTracker),
            progress: Arc::new(LogProgressReporter),
            traceback_limit: AppConfig::get().tasks.traceback_limit,
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_progress_reporter(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_traceback_limit(mut self, traceback_limit: usize) -> Self {
        self.traceback_limit = traceback_limit;
        self
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub(crate) fn module_store(&self) -> &Arc<dyn ModuleStore> {
        &self.module_store
    }

    pub(crate) fn module_system(&self) -> &Arc<dyn ModuleSystem> {
        &self.module_system
    }

    pub(crate) fn tracker(&self) -> &Arc<dyn Tracker> {
        &self.tracker
    }

    pub(crate) fn progress_reporter(&self) -> &Arc<dyn ProgressReporter> {
        &self.progress
    }

    pub(crate) fn traceback_limit(&self) -> usize {
        self.traceback_limit
    }

    /// 跟踪事件中使用的学生用户名，用户已不存在时使用学生 ID
    pub(crate) async fn student_username(&self, student_id: i64) -> Result<String> {
        Ok(self
            .storage
            .get_user_by_id(student_id)
            .await?
            .map(|user| user.username)
            .unwrap_or_else(|| student_id.to_string()))
    }

    // 重新评分，可只处理单个学生
    pub async fn rescore_problem(
        &self,
        task_id: &str,
        entry_id: i64,
        course_id: &str,
        task_input: &TaskInput,
        args: TaskInstanceArgs,
    ) -> Result<TaskProgress> {
        rescore::rescore_problem(self, task_id, entry_id, course_id, task_input, args).await
    }

    // 将所有学生的作答次数重置为 0
    pub async fn reset_problem_attempts(
        &self,
        task_id: &str,
        entry_id: i64,
        course_id: &str,
        task_input: &TaskInput,
        args: TaskInstanceArgs,
    ) -> Result<TaskProgress> {
        reset_attempts::reset_problem_attempts(self, task_id, entry_id, course_id, task_input, args)
            .await
    }

    // 删除所有学生的作答状态
    pub async fn delete_problem_state(
        &self,
        task_id: &str,
        entry_id: i64,
        course_id: &str,
        task_input: &TaskInput,
        args: TaskInstanceArgs,
    ) -> Result<TaskProgress> {
        delete_state::delete_problem_state(self, task_id, entry_id, course_id, task_input, args)
            .await
    }

    /// 按任务记录中的类型和输入执行任务，供外部调度器调用
    pub async fn run_task(
        &self,
        task_id: &str,
        entry_id: i64,
        args: TaskInstanceArgs,
    ) -> Result<TaskProgress> {
        let entry = self
            .storage
            .get_course_task_by_id(entry_id)
            .await?
            .ok_or_else(|| CourseTaskError::not_found(format!("任务记录 {entry_id} 不存在")))?;
        if entry.task_state.is_terminal() {
            return Err(CourseTaskError::validation(format!(
                "任务记录 {entry_id} 已结束，状态为 {}",
                entry.task_state
            )));
        }
        let task_input: TaskInput = serde_json::from_str(&entry.task_input)?;

        match entry.task_type {
            CourseTaskType::RescoreProblem => {
                self.rescore_problem(task_id, entry_id, &entry.course_id, &task_input, args)
                    .await
            }
            CourseTaskType::ResetProblemAttempts => {
                self.reset_problem_attempts(task_id, entry_id, &entry.course_id, &task_input, args)
                    .await
            }
            CourseTaskType::DeleteProblemState => {
                self.delete_problem_state(task_id, entry_id, &entry.course_id, &task_input, args)
                    .await
            }
        }
    }
}

/// 取出必填的题目位置
pub(crate) fn required_problem_url(task_input: &TaskInput) -> Result<&str> {
    task_input
        .problem_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| CourseTaskError::validation("task_input.problem_url is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course_tasks::entities::TaskState;
    use crate::services::course_tasks::testing::Fixture;

    #[tokio::test]
    async fn test_run_task_dispatches_by_type() {
        let fixture = Fixture::with_students(2).await;
        let entry = fixture.entry(CourseTaskType::DeleteProblemState).await;

        let progress = fixture
            .service
            .run_task("task-run", entry.id, TaskInstanceArgs::default())
            .await
            .unwrap();
        assert_eq!(progress.action_name, "deleted");
        assert_eq!(progress.updated, 2);
        assert_eq!(fixture.module_count().await, 0);
        assert_eq!(
            fixture.stored_entry(entry.id).await.task_state,
            TaskState::Success
        );
    }

    #[tokio::test]
    async fn test_run_task_refuses_finished_entry() {
        let fixture = Fixture::with_students(1).await;
        let entry = fixture.entry(CourseTaskType::ResetProblemAttempts).await;
        fixture
            .service
            .run_task("task-first", entry.id, TaskInstanceArgs::default())
            .await
            .unwrap();

        let err = fixture
            .service
            .run_task("task-again", entry.id, TaskInstanceArgs::default())
            .await
            .unwrap_err();
        assert_eq!(err.variant_name(), "Validation");
        assert_eq!(
            fixture.stored_entry(entry.id).await.task_id.as_deref(),
            Some("task-first")
        );
    }

    #[tokio::test]
    async fn test_missing_problem_url_is_rejected() {
        let fixture = Fixture::with_students(1).await;
        let entry = fixture.entry(CourseTaskType::ResetProblemAttempts).await;

        let err = fixture
            .service
            .reset_problem_attempts(
                "task-x",
                entry.id,
                Fixture::COURSE,
                &TaskInput::default(),
                TaskInstanceArgs::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.variant_name(), "Validation");
        assert_eq!(
            fixture.stored_entry(entry.id).await.task_state,
            TaskState::Pending
        );
    }
}
