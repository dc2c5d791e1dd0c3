//! 评分标准解析
//!
//! 结构：
//! ```text
//! <rubric>
//!   <category>
//!     <description>Category 1 Name</description>
//!     <score>1</score>
//!     <option points="0">Option 1 Name</option>
//!     <option points="5">Option 2 Name</option>
//!   </category>
//! </rubric>
//! ```
//!
//! 选项分值的自动生成、排序与重复检查都在这里完成。

use std::fmt;

use super::xml::XmlElement;
use crate::errors::{CourseTaskError, Result};
use crate::models::rubrics::entities::{RubricCategory, RubricDescription, RubricOption};

/// 评分标准输入：原始 XML 字符串或已解析的元素树
#[derive(Debug, Clone, Copy)]
pub enum RubricSource<'a> {
    Xml(&'a str),
    Element(&'a XmlElement),
}

impl<'a> From<&'a str> for RubricSource<'a> {
    fn from(xml: &'a str) -> Self {
        RubricSource::Xml(xml)
    }
}

impl<'a> From<&'a String> for RubricSource<'a> {
    fn from(xml: &'a String) -> Self {
        RubricSource::Xml(xml.as_str())
    }
}

impl<'a> From<&'a XmlElement> for RubricSource<'a> {
    fn from(element: &'a XmlElement) -> Self {
        RubricSource::Element(element)
    }
}

impl fmt::Display for RubricSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RubricSource::Xml(xml) => write!(f, "{xml}"),
            RubricSource::Element(element) => write!(f, "{element}"),
        }
    }
}

/// 类别内的分值编号模式
enum PointsNumbering {
    Auto { next: i64 },
    Explicit,
}

/// 解析评分标准的所有类别
///
/// "有分数"模式作为折叠状态在类别之间传递：第一个带 `<score>` 的类别
/// 打开该模式，之后的每个类别都必须带分数。
pub fn extract_categories<'a>(source: impl Into<RubricSource<'a>>) -> Result<RubricDescription> {
    let parsed;
    let root = match source.into() {
        RubricSource::Xml(xml) => {
            parsed = XmlElement::parse(xml)?;
            &parsed
        }
        RubricSource::Element(element) => element,
    };

    root.children
        .iter()
        .try_fold(RubricDescription::default(), |mut rubric, element| {
            if element.tag != "category" {
                return Err(CourseTaskError::rubric_parsing(format!(
                    "[extract_categories] Expected a <category> tag: got {} instead",
                    element.tag
                )));
            }
            let category = extract_category(element, rubric.has_score)?;
            rubric.has_score |= category.score.is_some();
            rubric.categories.push(category);
            Ok(rubric)
        })
}

/// 解析单个类别
pub fn extract_category(category: &XmlElement, has_score: bool) -> Result<RubricCategory> {
    let (description_xml, rest) = match category.children.split_first() {
        Some((first, rest)) if first.tag == "description" => (first, rest),
        Some((first, _)) => {
            return Err(CourseTaskError::rubric_parsing(format!(
                "[extract_category]: expected description tag, got {} instead",
                first.tag
            )));
        }
        None => {
            return Err(CourseTaskError::rubric_parsing(
                "[extract_category]: expected description tag, got an empty category instead",
            ));
        }
    };
    let description = description_xml.text.clone().unwrap_or_default();

    let (score, options_xml) = match rest.split_first() {
        Some((score_xml, options)) if score_xml.tag == "score" => {
            (Some(parse_score(score_xml)?), options)
        }
        _ if has_score => {
            return Err(CourseTaskError::rubric_parsing(format!(
                "[extract_category] Category {description} is missing a score"
            )));
        }
        _ => (None, rest),
    };

    let mut numbering = PointsNumbering::Auto { next: 0 };
    let mut options = Vec::with_capacity(options_xml.len());
    for option in options_xml {
        if option.tag != "option" {
            return Err(CourseTaskError::rubric_parsing(format!(
                "[extract_category]: expected option tag, got {} instead",
                option.tag
            )));
        }

        let points = match (option.attribute("points"), &mut numbering) {
            (Some(raw), numbering) if !raw.is_empty() => {
                *numbering = PointsNumbering::Explicit;
                parse_points(raw)?
            }
            (_, PointsNumbering::Auto { next }) => {
                let points = *next;
                *next += 1;
                points
            }
            (_, PointsNumbering::Explicit) => {
                return Err(CourseTaskError::rubric_configuration(
                    "[extract_category]: missing points attribute. Cannot continue to auto-create points values after a points value is explicitly defined.",
                ));
            }
        };

        options.push(RubricOption {
            text: option.text.clone().unwrap_or_default(),
            points,
            selected: score == Some(points),
        });
    }

    options.sort_by_key(|option| option.points);
    validate_options(&options)?;

    Ok(RubricCategory {
        description,
        score,
        options,
    })
}

/// 校验已排序的选项：至少一个选项，分值不能重复
pub fn validate_options(options: &[RubricOption]) -> Result<()> {
    if options.is_empty() {
        return Err(CourseTaskError::rubric_parsing(
            "[extract_category]: no options associated with this category",
        ));
    }
    if let Some(pair) = options.windows(2).find(|pair| pair[0].points == pair[1].points) {
        return Err(CourseTaskError::rubric_parsing(format!(
            "[extract_category]: found duplicate point values between two different options ({} points)",
            pair[0].points
        )));
    }
    Ok(())
}

fn parse_score(score_xml: &XmlElement) -> Result<i64> {
    let raw = score_xml.text.as_deref().unwrap_or_default();
    let score = raw.trim().parse::<i64>().map_err(|_| {
        CourseTaskError::rubric_parsing(format!(
            "[extract_category]: expected score to have int, got {raw} instead"
        ))
    })?;
    if score < 0 {
        return Err(CourseTaskError::rubric_parsing(format!(
            "[extract_category]: expected score to be non-negative, got {raw} instead"
        )));
    }
    Ok(score)
}

fn parse_points(raw: &str) -> Result<i64> {
    let points = raw.trim().parse::<i64>().map_err(|_| {
        CourseTaskError::rubric_parsing(format!(
            "[extract_category]: expected points to have int, got {raw} instead"
        ))
    })?;
    if points < 0 {
        return Err(CourseTaskError::rubric_parsing(format!(
            "[extract_category]: expected points to be non-negative, got {raw} instead"
        )));
    }
    Ok(points)
}
