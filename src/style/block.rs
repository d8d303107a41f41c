//! 样式块：一个选择器及其声明

use std::fmt;

use super::{Selector, Specificity, StyleProperty};
use crate::parsers::css::nest_media_queries;

/// 一个选择器、它的声明列表以及外层 `@media` 查询
///
/// 无法拆成声明的 at-rule（`@font-face`、`@keyframes` 等）以原文形式保存在
/// `verbatim` 中，永远不可内联。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    selector: Selector,
    properties: Vec<StyleProperty>,
    media: Vec<String>,
    verbatim: Option<String>,
}

impl StyleBlock {
    pub fn new(selector: Selector, properties: Vec<StyleProperty>, media: Vec<String>) -> Self {
        StyleBlock {
            selector,
            properties,
            media: normalize_media(media),
            verbatim: None,
        }
    }

    /// 原样保留的 at-rule
    pub fn verbatim(prelude: &str, body: Option<&str>, media: Vec<String>) -> Self {
        let text = match body {
            Some(body) => format!("{}{{{}}}", prelude.trim(), body.trim()),
            None => format!("{};", prelude.trim()),
        };
        StyleBlock {
            selector: Selector::with_specificity(prelude, Specificity::default()),
            properties: Vec::new(),
            media: normalize_media(media),
            verbatim: Some(text),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn properties(&self) -> &[StyleProperty] {
        &self.properties
    }

    pub fn specificity(&self) -> Specificity {
        self.selector.specificity()
    }

    pub fn selector_string(&self) -> &str {
        self.selector.as_str()
    }

    pub fn media(&self) -> &[String] {
        &self.media
    }

    /// 把块放进外层媒体查询之内
    pub fn within_media(mut self, outer: &[String]) -> Self {
        self.media = normalize_media(nest_media_queries(outer, &self.media));
        self
    }

    /// 只有所有媒体查询都是 `all` 时才算不受媒体限制
    pub fn has_inlinable_media(&self) -> bool {
        self.media.iter().all(|query| query.eq_ignore_ascii_case("all"))
    }

    pub fn is_inlinable(&self) -> bool {
        self.verbatim.is_none() && self.has_inlinable_media() && self.selector.is_inlinable()
    }

    /// 渲染为 `selector{prop:value;...}`，不包含外层 `@media`
    pub fn to_css(&self) -> String {
        if let Some(text) = &self.verbatim {
            return text.clone();
        }
        let declarations = self
            .properties
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";");
        format!("{}{{{}}}", self.selector, declarations)
    }
}

impl fmt::Display for StyleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn normalize_media(media: Vec<String>) -> Vec<String> {
    let media: Vec<String> = media
        .into_iter()
        .map(|query| query.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|query| !query.is_empty())
        .collect();
    if media.is_empty() {
        vec!["all".to_string()]
    } else {
        media
    }
}
