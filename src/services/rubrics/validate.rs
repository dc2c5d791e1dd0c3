use tracing::error;

use super::RubricEngine;
use crate::errors::{CourseTaskError, Result};

impl RubricEngine {
    /// 检查评分标准能否用于正式评分
    ///
    /// 每个类别贡献 `选项数 - 1` 分，总和必须等于题目配置的满分；
    /// 单个类别的选项数不能超过 `max_score_allowed + 1`。
    pub fn check_if_rubric_is_parseable(
        &self,
        rubric: &str,
        location: &str,
        max_score_allowed: i64,
        max_score: i64,
    ) -> Result<()> {
        let rendered = self.render_rubric(rubric)?;

        let mut total = 0i64;
        for category in &rendered.categories {
            let option_count = category.options.len() as i64;
            total += option_count - 1;
            if option_count > max_score_allowed + 1 {
                let message = format!(
                    "Number of score points in rubric {option_count} higher than the max allowed, which is {max_score_allowed}"
                );
                error!("{}", message);
                return Err(CourseTaskError::rubric_parsing(message));
            }
        }

        if total != max_score {
            let message = format!(
                "The max score {max_score} for problem {location} does not match the total number of points in the rubric {total}"
            );
            error!("{}", message);
            return Err(CourseTaskError::rubric_parsing(message));
        }

        Ok(())
    }

    /// 使用配置中的单类别最高分进行检查
    pub fn check_rubric(&self, rubric: &str, location: &str, max_score: i64) -> Result<()> {
        self.check_if_rubric_is_parseable(rubric, location, self.max_score_allowed(), max_score)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::rubrics::JsonRubricRenderer;

    const RUBRIC: &str = "<rubric>\
        <category><description>Ideas</description>\
        <option>None</option><option>Some</option><option>Many</option></category>\
        <category><description>Grammar</description>\
        <option>Poor</option><option>Good</option></category>\
        </rubric>";

    fn engine() -> RubricEngine {
        RubricEngine::new(Arc::new(JsonRubricRenderer), false).with_max_score_allowed(3)
    }

    #[test]
    fn test_matching_total_is_accepted() {
        engine()
            .check_if_rubric_is_parseable(RUBRIC, "i4x://course/problem/essay", 3, 3)
            .unwrap();
        engine().check_rubric(RUBRIC, "i4x://course/problem/essay", 3).unwrap();
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let err = engine()
            .check_if_rubric_is_parseable(RUBRIC, "i4x://course/problem/essay", 3, 4)
            .unwrap_err();
        assert_eq!(err.variant_name(), "RubricParsing");
        assert!(err.message().contains("max score 4"));
        assert!(err.message().contains("i4x://course/problem/essay"));
        assert!(err.message().contains("rubric 3"));
    }

    #[test]
    fn test_too_many_options_rejected() {
        let err = engine()
            .check_if_rubric_is_parseable(RUBRIC, "loc", 1, 3)
            .unwrap_err();
        assert!(err.message().contains("Number of score points in rubric 3"));
        assert!(err.message().contains("which is 1"));
    }

    #[test]
    fn test_unparseable_rubric_rejected() {
        let err = engine()
            .check_if_rubric_is_parseable("<rubric><bogus/></rubric>", "loc", 3, 0)
            .unwrap_err();
        assert_eq!(err.variant_name(), "RubricParsing");
    }
}
