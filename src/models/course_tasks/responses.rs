use serde::{Deserialize, Serialize};

/// 任务进度快照，成功时作为任务输出保存
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskProgress {
    pub action_name: String,
    pub attempted: u64,
    pub updated: u64,
    pub total: u64,
    pub duration_ms: i64,
}

/// 任务失败信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFailure {
    pub exception: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}
