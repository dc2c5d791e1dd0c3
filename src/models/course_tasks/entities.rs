use serde::{Deserialize, Serialize};

/// 后台任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,  // 已创建，尚未运行
    Progress, // 运行中
    Success,  // 成功
    Failure,  // 失败
}

impl TaskState {
    pub const PENDING: &'static str = "PENDING";
    pub const PROGRESS: &'static str = "PROGRESS";
    pub const SUCCESS: &'static str = "SUCCESS";
    pub const FAILURE: &'static str = "FAILURE";

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failure)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Pending => write!(f, "{}", TaskState::PENDING),
            TaskState::Progress => write!(f, "{}", TaskState::PROGRESS),
            TaskState::Success => write!(f, "{}", TaskState::SUCCESS),
            TaskState::Failure => write!(f, "{}", TaskState::FAILURE),
        }
    }
}

impl std::str::FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TaskState::PENDING => Ok(TaskState::Pending),
            TaskState::PROGRESS => Ok(TaskState::Progress),
            TaskState::SUCCESS => Ok(TaskState::Success),
            TaskState::FAILURE => Ok(TaskState::Failure),
            _ => Err(format!("Invalid task state: {s}")),
        }
    }
}

/// 后台任务类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseTaskType {
    RescoreProblem,       // 重新评分
    ResetProblemAttempts, // 重置作答次数
    DeleteProblemState,   // 删除作答状态
}

impl CourseTaskType {
    pub const RESCORE_PROBLEM: &'static str = "rescore_problem";
    pub const RESET_PROBLEM_ATTEMPTS: &'static str = "reset_problem_attempts";
    pub const DELETE_PROBLEM_STATE: &'static str = "delete_problem_state";
}

impl std::fmt::Display for CourseTaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseTaskType::RescoreProblem => write!(f, "{}", CourseTaskType::RESCORE_PROBLEM),
            CourseTaskType::ResetProblemAttempts => {
                write!(f, "{}", CourseTaskType::RESET_PROBLEM_ATTEMPTS)
            }
            CourseTaskType::DeleteProblemState => {
                write!(f, "{}", CourseTaskType::DELETE_PROBLEM_STATE)
            }
        }
    }
}

impl std::str::FromStr for CourseTaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CourseTaskType::RESCORE_PROBLEM => Ok(CourseTaskType::RescoreProblem),
            CourseTaskType::RESET_PROBLEM_ATTEMPTS => Ok(CourseTaskType::ResetProblemAttempts),
            CourseTaskType::DELETE_PROBLEM_STATE => Ok(CourseTaskType::DeleteProblemState),
            _ => Err(format!("Invalid course task type: {s}")),
        }
    }
}

/// 课程后台任务记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseTask {
    // 唯一 ID
    pub id: i64,
    // 任务类型
    pub task_type: CourseTaskType,
    // 课程 ID
    pub course_id: String,
    // 题目位置
    pub task_key: String,
    // 任务输入（JSON）
    pub task_input: String,
    // 队列分配的任务 ID，开始运行时写入
    pub task_id: Option<String>,
    // 任务状态
    pub task_state: TaskState,
    // 任务输出（JSON），进度或错误信息
    pub task_output: Option<String>,
    // 发起人 ID
    pub requester_id: Option<i64>,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_state_round_trip_strings() {
        assert_eq!("FAILURE".parse::<TaskState>().unwrap(), TaskState::Failure);
        assert_eq!(TaskState::Progress.to_string(), "PROGRESS");
        assert!("running".parse::<TaskState>().is_err());
        assert!(TaskState::Success.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
    }

    #[test]
    fn test_task_type_strings() {
        assert_eq!(
            "reset_problem_attempts".parse::<CourseTaskType>().unwrap(),
            CourseTaskType::ResetProblemAttempts
        );
        assert_eq!(
            CourseTaskType::DeleteProblemState.to_string(),
            "delete_problem_state"
        );
    }
}
