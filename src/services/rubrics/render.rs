use tracing::error;

use super::extract::{RubricSource, extract_categories};
use super::renderer::RUBRIC_TEMPLATE;
use super::RubricEngine;
use crate::errors::{CourseTaskError, Result};
use crate::models::rubrics::responses::{RenderedRubric, RubricTemplateContext};

impl RubricEngine {
    /// 解析评分标准并渲染
    ///
    /// 除配置错误外，所有失败（包括模板渲染）都会记录原始错误，
    /// 然后统一转换为带原始 XML 的解析错误。
    pub fn render_rubric<'a>(&self, source: impl Into<RubricSource<'a>>) -> Result<RenderedRubric> {
        let source = source.into();
        self.try_render(source).map_err(|err| {
            if err.is_rubric_configuration() {
                return err;
            }
            let message = format!("[render_rubric] Could not parse the rubric with xml: {source}");
            error!("{} ({})", message, err);
            CourseTaskError::rubric_parsing(message)
        })
    }

    fn try_render(&self, source: RubricSource<'_>) -> Result<RenderedRubric> {
        let rubric = extract_categories(source)?;
        let rubric_scores = rubric.scores();
        let max_score = rubric
            .max_score()
            .ok_or_else(|| CourseTaskError::rubric_parsing("rubric has no categories"))?;

        let context = RubricTemplateContext {
            categories: rubric.categories,
            has_score: rubric.has_score,
            view_only: self.view_only,
            max_score,
        };
        let html = self.renderer.render_template(RUBRIC_TEMPLATE, &context)?;

        Ok(RenderedRubric {
            html,
            categories: context.categories,
            rubric_scores,
            max_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::rubrics::{JsonRubricRenderer, RubricRenderer};

    struct FailingRenderer;

    impl RubricRenderer for FailingRenderer {
        fn render_template(&self, _: &str, _: &RubricTemplateContext) -> Result<String> {
            Err(CourseTaskError::template("template missing"))
        }
    }

    fn engine() -> RubricEngine {
        RubricEngine::new(Arc::new(JsonRubricRenderer), true)
    }

    const SCORED: &str = "<rubric>\
        <category><description>Ideas</description><score>2</score>\
        <option>None</option><option>Some</option><option>Many</option></category>\
        <category><description>Grammar</description><score>0</score>\
        <option points=\"0\">Poor</option><option points=\"1\">Good</option></category>\
        </rubric>";

    #[test]
    fn test_render_payload() {
        let rendered = engine().render_rubric(SCORED).unwrap();
        assert_eq!(rendered.max_score, 2);
        assert_eq!(rendered.rubric_scores, vec![Some(2), Some(0)]);
        assert_eq!(rendered.categories.len(), 2);

        let html: serde_json::Value = serde_json::from_str(&rendered.html).unwrap();
        assert_eq!(html["has_score"], true);
        assert_eq!(html["view_only"], true);
        assert_eq!(html["max_score"], 2);
        assert_eq!(html["categories"][0]["options"][2]["selected"], true);
    }

    #[test]
    fn test_unscored_payload_has_empty_scores() {
        let rendered = engine()
            .render_rubric(
                "<rubric><category><description>D</description><option>a</option><option>b</option></category></rubric>",
            )
            .unwrap();
        assert_eq!(rendered.rubric_scores, vec![None]);
        let html: serde_json::Value = serde_json::from_str(&rendered.html).unwrap();
        assert_eq!(html["has_score"], false);
    }

    #[test]
    fn test_parse_failure_is_wrapped_with_input() {
        let xml = "<rubric><category><description>D</description></category></rubric>";
        let err = engine().render_rubric(xml).unwrap_err();
        assert_eq!(err.variant_name(), "RubricParsing");
        assert!(err.message().contains(xml));
    }

    #[test]
    fn test_empty_rubric_rejected() {
        let err = engine().render_rubric("<rubric></rubric>").unwrap_err();
        assert_eq!(err.variant_name(), "RubricParsing");
    }

    #[test]
    fn test_renderer_failure_is_wrapped() {
        let engine = RubricEngine::new(Arc::new(FailingRenderer), false);
        let err = engine.render_rubric(SCORED).unwrap_err();
        assert_eq!(err.variant_name(), "RubricParsing");
        assert!(err.message().contains("Could not parse the rubric"));
    }

    #[test]
    fn test_configuration_error_passes_through() {
        let err = engine()
            .render_rubric(
                r#"<rubric><category><description>D</description><option points="3">a</option><option>b</option></category></rubric>"#,
            )
            .unwrap_err();
        assert!(err.is_rubric_configuration());
    }
}
