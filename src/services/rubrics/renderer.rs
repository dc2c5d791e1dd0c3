//! 评分标准模板渲染

use crate::errors::{CourseTaskError, Result};
use crate::models::rubrics::responses::RubricTemplateContext;

/// 评分标准使用的模板名
pub const RUBRIC_TEMPLATE: &str = "open_ended_rubric.html";

/// 模板渲染器
pub trait RubricRenderer: Send + Sync {
    fn render_template(&self, template: &str, context: &RubricTemplateContext) -> Result<String>;
}

/// 将模板上下文直接渲染为 JSON，供前端自行展示
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRubricRenderer;

impl RubricRenderer for JsonRubricRenderer {
    fn render_template(&self, template: &str, context: &RubricTemplateContext) -> Result<String> {
        serde_json::to_string(context).map_err(|e| {
            CourseTaskError::template(format!("渲染模板 {template} 失败: {e}"))
        })
    }
}
