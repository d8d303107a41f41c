//! 样式表收集
//!
//! [`AssetScanner`] 在 DOM 中查找 `<style>` 元素和引用样式表的 `<link>` 元素，
//! 通过提供者读取它们的内容。

use kuchiki::NodeRef;
use tracing::{debug, warn};

use super::dom::{get_node_attr, get_node_name};
use super::parser::{is_active_stylesheet, media_applies_to_screen, media_qualifiers};
use crate::error::MailstyleResult;
use crate::providers::{AssetProvider, ProviderList};
use crate::style::Stylesheet;
use crate::utils::url::path_is_absolute;

/// 带有此属性的 `<style>`/`<link>` 元素不会被收集
pub const IGNORE_ATTRIBUTE: &str = "data-mailstyle-ignore";

/// 内嵌样式表的名称
const INLINE_STYLESHEET_NAME: &str = "(inline)";

/// 在 DOM 中查找样式表
///
/// 相对路径的 `<link>` 通过本地提供者严格查找，找不到时返回错误；
/// 绝对URL的 `<link>` 通过外部提供者查找，找不到时元素保留在原处。
pub struct AssetScanner<'a> {
    dom: &'a NodeRef,
    asset_providers: &'a ProviderList,
    external_asset_providers: &'a ProviderList,
}

impl<'a> AssetScanner<'a> {
    pub fn new(
        dom: &'a NodeRef,
        asset_providers: &'a ProviderList,
        external_asset_providers: &'a ProviderList,
    ) -> Self {
        AssetScanner {
            dom,
            asset_providers,
            external_asset_providers,
        }
    }

    /// 按文档顺序读取所有样式表，不修改 DOM
    pub fn find_css(&self) -> MailstyleResult<Vec<Stylesheet>> {
        let mut stylesheets = Vec::new();
        for element in self.stylesheet_elements() {
            if let Some(stylesheet) = self.read_stylesheet(&element)? {
                stylesheets.push(stylesheet);
            }
        }
        Ok(stylesheets)
    }

    /// 按文档顺序读取所有样式表，并把成功读取的元素从 DOM 中移除
    pub fn extract_css(&self) -> MailstyleResult<Vec<Stylesheet>> {
        let mut stylesheets = Vec::new();
        for element in self.stylesheet_elements() {
            if let Some(stylesheet) = self.read_stylesheet(&element)? {
                element.detach();
                stylesheets.push(stylesheet);
            }
        }
        debug!("Extracted {} stylesheets from document", stylesheets.len());
        Ok(stylesheets)
    }

    fn stylesheet_elements(&self) -> Vec<NodeRef> {
        self.dom
            .inclusive_descendants()
            .filter(|node| is_stylesheet_element(node))
            .collect()
    }

    fn read_stylesheet(&self, element: &NodeRef) -> MailstyleResult<Option<Stylesheet>> {
        let media = media_qualifiers(&get_node_attr(element, "media").unwrap_or_default());
        let stylesheet = self.load_stylesheet(element)?;
        Ok(stylesheet.map(|stylesheet| stylesheet.within_media(&media)))
    }

    fn load_stylesheet(&self, element: &NodeRef) -> MailstyleResult<Option<Stylesheet>> {
        if get_node_name(element).as_deref() == Some("style") {
            return Stylesheet::new(INLINE_STYLESHEET_NAME, &element.text_contents()).map(Some);
        }

        let Some(href) = get_node_attr(element, "href") else {
            return Ok(None);
        };
        let href = href.trim();

        if path_is_absolute(href)? {
            let stylesheet = self.external_asset_providers.find_stylesheet(href)?;
            if stylesheet.is_none() {
                warn!("Leaving external stylesheet {:?} in place", href);
            }
            Ok(stylesheet)
        } else {
            self.asset_providers.find_stylesheet_strict(href).map(Some)
        }
    }
}

fn is_stylesheet_element(node: &NodeRef) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    let attributes = element.attributes.borrow();
    if attributes.contains(IGNORE_ATTRIBUTE) {
        return false;
    }
    if !media_applies_to_screen(attributes.get("media").unwrap_or_default()) {
        return false;
    }

    match &*element.name.local {
        "style" => true,
        "link" => {
            attributes.contains("href")
                && is_active_stylesheet(attributes.get("rel").unwrap_or_default())
        }
        _ => false,
    }
}

/// 移除树中所有的忽略标记
pub fn remove_ignore_markers(dom: &NodeRef) {
    for node in dom.inclusive_descendants() {
        if let Some(element) = node.as_element() {
            element.attributes.borrow_mut().remove(IGNORE_ATTRIBUTE);
        }
    }
}
