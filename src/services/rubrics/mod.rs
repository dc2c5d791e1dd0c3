//! 开放式题目的评分标准
//!
//! - `extract`: 解析与结构校验
//! - `render`: 生成渲染数据并调用模板渲染器
//! - `validate`: 与题目配置的满分做一致性校验

pub mod extract;
pub mod render;
pub mod renderer;
pub mod validate;
pub mod xml;

use std::sync::Arc;

use crate::config::AppConfig;

pub use extract::{RubricSource, extract_categories};
pub use renderer::{JsonRubricRenderer, RUBRIC_TEMPLATE, RubricRenderer};
pub use xml::XmlElement;

/// 评分标准引擎
///
/// 不保存任何解析状态，可以在多个线程中复用。
#[derive(Clone)]
pub struct RubricEngine {
    renderer: Arc<dyn RubricRenderer>,
    view_only: bool,
    max_score_allowed: i64,
}

impl RubricEngine {
    pub fn new(renderer: Arc<dyn RubricRenderer>, view_only: bool) -> Self {
        Self {
            renderer,
            view_only,
            max_score_allowed: AppConfig::get().rubric.max_score_allowed,
        }
    }

    /// 使用全局配置创建
    pub fn from_config(renderer: Arc<dyn RubricRenderer>) -> Self {
        let config = AppConfig::get();
        Self {
            renderer,
            view_only: config.rubric.view_only,
            max_score_allowed: config.rubric.max_score_allowed,
        }
    }

    pub fn with_max_score_allowed(mut self, max_score_allowed: i64) -> Self {
        self.max_score_allowed = max_score_allowed;
        self
    }

    pub fn view_only(&self) -> bool {
        self.view_only
    }

    pub fn max_score_allowed(&self) -> i64 {
        self.max_score_allowed
    }
}
