//! 链接重写模块
//!
//! 负责把 HTML 中的相对链接改写为绝对URL，邮件客户端无法解析相对地址。

use kuchiki::NodeRef;
use tracing::debug;

use crate::error::MailstyleResult;
use crate::parsers::css::rewrite_css_urls;
use crate::parsers::html::dom::{get_node_attr, get_node_name, set_node_attr};
use crate::utils::url::UrlGenerator;

/// 链接重写器的公共接口
pub trait UrlRewrite {
    /// 改写整棵树中的链接
    fn transform_dom(&self, dom: &NodeRef) -> MailstyleResult<()>;

    /// 改写一段 CSS 中的 `url()` 引用
    fn transform_css(&self, css: &str) -> MailstyleResult<String>;
}

/// 什么都不做的重写器，在没有配置 URL 选项时使用
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUrlRewriter;

impl UrlRewrite for NullUrlRewriter {
    fn transform_dom(&self, _dom: &NodeRef) -> MailstyleResult<()> {
        Ok(())
    }

    fn transform_css(&self, css: &str) -> MailstyleResult<String> {
        Ok(css.to_string())
    }
}

/// 基于 [`UrlGenerator`] 的重写器
///
/// 处理以下位置：
///
/// * `a[href]` 和 `img[src]`
/// * 任意元素的 `background` 属性
/// * 任意元素的 `style` 属性中的 `url()`
/// * `<style>` 元素内容中的 `url()`
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    generator: UrlGenerator,
}

impl UrlRewriter {
    pub fn new(generator: UrlGenerator) -> Self {
        UrlRewriter { generator }
    }

    pub fn generator(&self) -> &UrlGenerator {
        &self.generator
    }

    fn rewrite_attr(&self, node: &NodeRef, attr_name: &str) -> MailstyleResult<()> {
        if let Some(value) = get_node_attr(node, attr_name) {
            let rewritten = self.generator.generate(value.trim(), "/")?;
            if rewritten != value {
                set_node_attr(node, attr_name, Some(rewritten));
            }
        }
        Ok(())
    }

    fn rewrite_style_attr(&self, node: &NodeRef) -> MailstyleResult<()> {
        if let Some(style) = get_node_attr(node, "style") {
            let rewritten = self.transform_css(&style)?;
            if rewritten != style {
                set_node_attr(node, "style", Some(rewritten));
            }
        }
        Ok(())
    }

    fn rewrite_style_element(&self, node: &NodeRef) -> MailstyleResult<()> {
        for child in node.children() {
            if let Some(text) = child.as_text() {
                let rewritten = self.transform_css(&text.borrow())?;
                *text.borrow_mut() = rewritten;
            }
        }
        Ok(())
    }
}

impl UrlRewrite for UrlRewriter {
    fn transform_dom(&self, dom: &NodeRef) -> MailstyleResult<()> {
        let elements: Vec<NodeRef> = dom
            .inclusive_descendants()
            .filter(|node| node.as_element().is_some())
            .collect();
        debug!("Rewriting URLs in {} elements", elements.len());

        for node in &elements {
            match get_node_name(node).as_deref() {
                Some("a") => self.rewrite_attr(node, "href")?,
                Some("img") => self.rewrite_attr(node, "src")?,
                Some("style") => self.rewrite_style_element(node)?,
                _ => {}
            }
            self.rewrite_attr(node, "background")?;
            self.rewrite_style_attr(node)?;
        }

        Ok(())
    }

    fn transform_css(&self, css: &str) -> MailstyleResult<String> {
        rewrite_css_urls(css, |url| self.generator.generate(url.trim(), "/"))
    }
}
