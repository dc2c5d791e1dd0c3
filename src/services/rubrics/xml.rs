//! 评分标准 XML 元素树
//!
//! 基于 xml-rs 的事件流构建一棵最小的元素树，只保留评分标准需要的信息：
//! 标签名、属性、第一个子元素之前的文本以及子元素。

use std::fmt;

use xml::escape::{escape_str_attribute, escape_str_pcdata};
use xml::reader::{EventReader, XmlEvent};

use crate::errors::{CourseTaskError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// 获取属性值
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 从 XML 字符串解析根元素
    pub fn parse(source: &str) -> Result<XmlElement> {
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        for event in EventReader::from_str(source) {
            match event? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => {
                    let mut element = XmlElement::new(name.local_name);
                    element.attributes = attributes
                        .into_iter()
                        .map(|attr| (attr.name.local_name, attr.value))
                        .collect();
                    stack.push(element);
                }
                XmlEvent::EndElement { .. } => {
                    let Some(element) = stack.pop() else {
                        return Err(CourseTaskError::rubric_parsing(
                            "invalid rubric xml: unbalanced end tag",
                        ));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                XmlEvent::Characters(text)
                | XmlEvent::CData(text)
                | XmlEvent::Whitespace(text) => {
                    // 只记录第一个子元素之前的文本
                    if let Some(current) = stack.last_mut()
                        && current.children.is_empty()
                    {
                        current.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                _ => {}
            }
        }

        root.ok_or_else(|| CourseTaskError::rubric_parsing("invalid rubric xml: no root element"))
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {}=\"{}\"", name, escape_str_attribute(value))?;
        }
        if self.text.is_none() && self.children.is_empty() {
            return write!(f, "/>");
        }
        write!(f, ">")?;
        if let Some(text) = &self.text {
            write!(f, "{}", escape_str_pcdata(text))?;
        }
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.tag)
    }
}
