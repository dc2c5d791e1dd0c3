//! 课程内容相关的外部协作方
//!
//! 题目描述由 `ModuleStore` 提供，带学生状态的题目实例由 `ModuleSystem` 创建。

use serde_json::{Map, Value};

use super::tracking::TrackFunction;
use crate::errors::Result;
use crate::models::users::entities::User;

/// 题目描述
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    pub location: String,
    pub category: String,
    pub display_name: Option<String>,
}

impl ModuleDescriptor {
    pub fn new(location: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            category: category.into(),
            display_name: None,
        }
    }
}

/// 课程内容仓库
#[async_trait::async_trait]
pub trait ModuleStore: Send + Sync {
    /// 查找课程中的题目描述，不存在时返回 `ModuleStore` 错误
    async fn get_instance(&self, course_id: &str, location: &str) -> Result<ModuleDescriptor>;
}

/// 创建题目实例所需的上下文
pub struct ModuleInstanceRequest<'a> {
    pub course_id: &'a str,
    pub student: &'a User,
    pub descriptor: &'a ModuleDescriptor,
    // 评分分桶类型，例如 "rescore"
    pub grade_bucket_type: Option<&'a str>,
    pub xqueue_callback_url_prefix: &'a str,
    // 题目实例产生的跟踪事件通过它写出
    pub track_function: TrackFunction,
}

/// 题目实例工厂
#[async_trait::async_trait]
pub trait ModuleSystem: Send + Sync {
    /// 为学生创建题目实例；无权访问时返回 `None`
    async fn get_module_for_descriptor(
        &self,
        request: ModuleInstanceRequest<'_>,
    ) -> Result<Option<Box<dyn ProblemModule>>>;
}

/// 带学生作答状态的题目实例
#[async_trait::async_trait]
pub trait ProblemModule: Send + Sync {
    /// 是否支持重新评分
    fn supports_rescoring(&self) -> bool {
        false
    }

    /// 重新评分，返回题目给出的结果，`success` 字段为 `correct` 或 `incorrect` 时视为成功
    async fn rescore_problem(&mut self) -> Result<Map<String, Value>>;
}
