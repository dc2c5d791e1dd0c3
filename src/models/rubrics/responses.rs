use serde::Serialize;
use ts_rs::TS;

use super::entities::RubricCategory;

/// 模板渲染上下文
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "rubric.ts")]
pub struct RubricTemplateContext {
    pub categories: Vec<RubricCategory>,
    pub has_score: bool,
    pub view_only: bool,
    pub max_score: i64,
}

/// 渲染结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "rubric.ts")]
pub struct RenderedRubric {
    pub html: String,
    pub categories: Vec<RubricCategory>,
    pub rubric_scores: Vec<Option<i64>>,
    pub max_score: i64,
}
