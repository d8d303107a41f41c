//! 解析后的样式表

use std::fmt;

use tracing::debug;

use super::{Selector, StyleBlock, StyleProperty};
use crate::error::{MailstyleError, MailstyleResult};
use crate::parsers::css::{parse_rules, split_comma_list, split_declarations, CssRule};

/// 一个有名字的样式表，由若干样式块组成
///
/// 名字用于错误信息，通常是文件路径或URL。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub name: String,
    blocks: Vec<StyleBlock>,
}

impl Stylesheet {
    /// 解析CSS文本
    ///
    /// 逗号分隔的选择器列表会拆成多个样式块，每块共享同一组声明，
    /// 但各自携带自己的特异性。任何一条声明无法解析都会返回
    /// [`MailstyleError::MalformedDeclaration`]。
    pub fn new(name: impl Into<String>, css: &str) -> MailstyleResult<Self> {
        let name = name.into();
        let css = css.strip_prefix('\u{feff}').unwrap_or(css);
        let mut blocks = Vec::new();

        for rule in parse_rules(css) {
            match rule {
                CssRule::Style {
                    selectors,
                    declarations,
                    media,
                } => {
                    let declarations = split_declarations(&declarations);
                    for selector in split_comma_list(&selectors) {
                        let selector = Selector::new(&selector);
                        let properties = declarations
                            .iter()
                            .map(|declaration| {
                                StyleProperty::parse(declaration, selector.specificity()).ok_or_else(
                                    || MailstyleError::MalformedDeclaration {
                                        declaration: declaration.clone(),
                                        stylesheet: name.clone(),
                                    },
                                )
                            })
                            .collect::<MailstyleResult<Vec<_>>>()?;
                        blocks.push(StyleBlock::new(selector, properties, media.clone()));
                    }
                }
                CssRule::AtRule {
                    prelude,
                    body,
                    media,
                } => {
                    blocks.push(StyleBlock::verbatim(&prelude, body.as_deref(), media));
                }
            }
        }

        debug!("Parsed stylesheet {:?} into {} blocks", name, blocks.len());
        Ok(Stylesheet { name, blocks })
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Stylesheet {
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    /// 整个样式表只在这些媒体查询下生效，例如来自 `<style media="...">`
    pub fn within_media(mut self, media: &[String]) -> Self {
        if !media.is_empty() {
            self.blocks = self
                .blocks
                .into_iter()
                .map(|block| block.within_media(media))
                .collect();
        }
        self
    }

    pub fn blocks(&self) -> &[StyleBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 所有可以写进 style 属性的样式块
    pub fn inlinable_blocks(&self) -> impl Iterator<Item = &StyleBlock> {
        self.blocks.iter().filter(|block| block.is_inlinable())
    }

    /// 渲染回CSS文本，每个块一行
    pub fn to_css(&self) -> String {
        self.blocks
            .iter()
            .map(|block| {
                if block.has_inlinable_media() {
                    block.to_css()
                } else {
                    format!("@media {}{{{}}}", block.media().join(", "), block.to_css())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
