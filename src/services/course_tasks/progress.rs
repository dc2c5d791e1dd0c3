//! 任务进度上报

use tokio::sync::watch;
use tracing::debug;

use crate::models::course_tasks::responses::TaskProgress;

/// 进度接收方，上报失败不影响任务本身
pub trait ProgressReporter: Send + Sync {
    fn report(&self, task_id: &str, progress: &TaskProgress);
}

/// 将进度写入调试日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn report(&self, task_id: &str, progress: &TaskProgress) {
        debug!(
            "task {} {}: {}/{} attempted, {} updated, {}ms",
            task_id,
            progress.action_name,
            progress.attempted,
            progress.total,
            progress.updated,
            progress.duration_ms
        );
    }
}

/// 通过 watch 通道发布最新进度，供状态查询方订阅
pub struct WatchProgressReporter {
    sender: watch::Sender<Option<TaskProgress>>,
}

impl WatchProgressReporter {
    pub fn channel() -> (Self, watch::Receiver<Option<TaskProgress>>) {
        let (sender, receiver) = watch::channel(None);
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<TaskProgress>> {
        self.sender.subscribe()
    }
}

impl ProgressReporter for WatchProgressReporter {
    fn report(&self, _task_id: &str, progress: &TaskProgress) {
        // 没有订阅者时也保留最新值
        self.sender.send_replace(Some(progress.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_keeps_latest_snapshot() {
        let (reporter, receiver) = WatchProgressReporter::channel();
        for attempted in 1..=3 {
            reporter.report(
                "task",
                &TaskProgress {
                    action_name: "reset".into(),
                    attempted,
                    updated: attempted,
                    total: 3,
                    duration_ms: 0,
                },
            );
        }
        let latest = receiver.borrow().clone().unwrap();
        assert_eq!(latest.attempted, 3);
        assert_eq!(reporter.subscribe().borrow().as_ref(), Some(&latest));
    }
}
