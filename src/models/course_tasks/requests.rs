use serde::{Deserialize, Serialize};

use super::entities::CourseTaskType;

/// 创建后台任务记录请求
#[derive(Debug, Clone)]
pub struct CreateCourseTaskRequest {
    pub task_type: CourseTaskType,
    pub course_id: String,
    pub task_key: String,
    pub task_input: TaskInput,
    pub requester_id: Option<i64>,
}

/// 任务输入
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskInput {
    // 题目位置（必填）
    pub problem_url: Option<String>,
    // 指定学生的用户名或邮箱，缺省时处理所有学生
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
}

impl TaskInput {
    pub fn for_problem(problem_url: impl Into<String>) -> Self {
        Self {
            problem_url: Some(problem_url.into()),
            student: None,
        }
    }

    pub fn with_student(mut self, student: impl Into<String>) -> Self {
        self.student = Some(student.into());
        self
    }
}

/// 透传给各个更新函数的上下文
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskInstanceArgs {
    // 请求相关的跟踪信息，原样写入跟踪事件
    #[serde(default)]
    pub request_info: serde_json::Map<String, serde_json::Value>,
    // 评分队列回调地址前缀
    #[serde(default)]
    pub xqueue_callback_url_prefix: String,
    // 当前任务 ID，由任务运行器写入
    #[serde(default)]
    pub task_id: Option<String>,
}
