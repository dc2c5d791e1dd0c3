use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 评分选项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "rubric.ts")]
pub struct RubricOption {
    // 选项文字
    pub text: String,
    // 选项分值
    pub points: i64,
    // 是否为该类别当前的得分
    pub selected: bool,
}

/// 评分类别
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "rubric.ts")]
pub struct RubricCategory {
    // 类别描述
    pub description: String,
    // 评分者给出的分数，未评分时为空
    pub score: Option<i64>,
    // 按分值升序排列的选项
    pub options: Vec<RubricOption>,
}

impl RubricCategory {
    /// 该类别的最高分值
    pub fn max_points(&self) -> Option<i64> {
        self.options.last().map(|option| option.points)
    }
}

/// 解析后的评分标准
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RubricDescription {
    pub categories: Vec<RubricCategory>,
    // 是否有类别带分数
    pub has_score: bool,
}

impl RubricDescription {
    pub fn scores(&self) -> Vec<Option<i64>> {
        self.categories.iter().map(|category| category.score).collect()
    }

    /// 所有类别最高分值中的最大值
    pub fn max_score(&self) -> Option<i64> {
        self.categories
            .iter()
            .filter_map(RubricCategory::max_points)
            .max()
    }
}
