//! 任务跟踪事件

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::models::course_tasks::requests::TaskInstanceArgs;

/// 后台任务产生的跟踪事件所在页面
pub const TASK_TRACK_PAGE: &str = "x_module_task";

/// 没有任务 ID 时使用的占位值
pub const UNKNOWN_TASK_ID: &str = "unknown-task_id";

/// 附加到每个跟踪事件的任务信息
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskInfo {
    pub student: String,
    pub task_id: String,
}

impl TaskInfo {
    pub fn new(student: impl Into<String>, args: &TaskInstanceArgs) -> Self {
        Self {
            student: student.into(),
            task_id: args
                .task_id
                .clone()
                .unwrap_or_else(|| UNKNOWN_TASK_ID.to_string()),
        }
    }
}

/// 跟踪事件接收方
pub trait Tracker: Send + Sync {
    fn track(
        &self,
        request_info: &Map<String, Value>,
        task_info: &TaskInfo,
        event_type: &str,
        event: Value,
        page: &str,
    );
}

/// 题目实例使用的跟踪函数，已绑定请求信息和任务信息
pub type TrackFunction = Arc<dyn Fn(&str, Value) + Send + Sync>;

/// 绑定请求信息和任务信息，生成跟踪函数
pub fn make_track_function(
    tracker: Arc<dyn Tracker>,
    request_info: Map<String, Value>,
    task_info: TaskInfo,
) -> TrackFunction {
    Arc::new(move |event_type: &str, event: Value| {
        tracker.track(&request_info, &task_info, event_type, event, TASK_TRACK_PAGE)
    })
}

/// 将跟踪事件写入日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracker;

impl Tracker for LogTracker {
    fn track(
        &self,
        request_info: &Map<String, Value>,
        task_info: &TaskInfo,
        event_type: &str,
        event: Value,
        page: &str,
    ) {
        let request_info = Value::Object(request_info.clone());
        info!(
            target: "course_tasks::tracking",
            event_type,
            page,
            student = %task_info.student,
            task_id = %task_info.task_id,
            request_info = %request_info,
            event = %event,
            "tracking event"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, String, String)>>);

    impl Tracker for Recorder {
        fn track(&self, _: &Map<String, Value>, info: &TaskInfo, event_type: &str, _: Value, page: &str) {
            self.0
                .lock()
                .unwrap()
                .push((info.task_id.clone(), event_type.to_string(), page.to_string()));
        }
    }

    #[test]
    fn test_log_tracker_accepts_events() {
        let mut request_info = Map::new();
        request_info.insert("host".into(), Value::from("lms.example.com"));
        LogTracker.track(
            &request_info,
            &TaskInfo::new("alice", &TaskInstanceArgs::default()),
            "problem_delete_state",
            Value::Object(Map::new()),
            TASK_TRACK_PAGE,
        );
    }

    #[test]
    fn test_task_id_falls_back() {
        let info = TaskInfo::new("alice", &TaskInstanceArgs::default());
        assert_eq!(info.task_id, UNKNOWN_TASK_ID);

        let args = TaskInstanceArgs {
            task_id: Some("task-1".into()),
            ..Default::default()
        };
        assert_eq!(TaskInfo::new("alice", &args).task_id, "task-1");
    }

    #[test]
    fn test_track_function_uses_task_page() {
        let recorder = Arc::new(Recorder::default());
        let track = make_track_function(
            recorder.clone(),
            Map::new(),
            TaskInfo::new("alice", &TaskInstanceArgs::default()),
        );
        track("problem_rescore", Value::Null);

        let events = recorder.0.lock().unwrap();
        assert_eq!(
            events[0],
            (
                UNKNOWN_TASK_ID.to_string(),
                "problem_rescore".to_string(),
                TASK_TRACK_PAGE.to_string()
            )
        );
    }
}
