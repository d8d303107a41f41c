//! 把样式表内联到 DOM 中

use kuchiki::NodeRef;
use tracing::{debug, warn};

use super::{StyleBlock, StyleMap, Stylesheet};
use crate::error::MailstyleError;
use crate::parsers::html::dom::{create_element, find_first, fragment_root};

/// 无法内联的样式放在哪里
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UninlinableTarget {
    /// 追加到 `<head>` 末尾（完整文档）
    #[default]
    Head,
    /// 插入到片段根的最前面（HTML 片段）
    FragmentRoot,
}

/// 内联选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineOptions {
    pub keep_uninlinable_css: bool,
    pub merge_media_queries: bool,
    pub target: UninlinableTarget,
}

impl Default for InlineOptions {
    fn default() -> Self {
        InlineOptions {
            keep_uninlinable_css: true,
            merge_media_queries: true,
            target: UninlinableTarget::Head,
        }
    }
}

/// 内联器
///
/// 对每个可内联的样式块按选择器在 DOM 上查找元素，把声明交给 [`StyleMap`]
/// 累积，最后一次性写回 style 属性。选择器无法求值时记录警告并跳过。
pub struct Inliner<'a> {
    stylesheets: &'a [Stylesheet],
    dom: &'a NodeRef,
}

impl<'a> Inliner<'a> {
    pub fn new(stylesheets: &'a [Stylesheet], dom: &'a NodeRef) -> Self {
        Inliner { stylesheets, dom }
    }

    /// 执行内联，返回过程中被跳过的选择器错误
    pub fn inline(&self, options: &InlineOptions) -> Vec<MailstyleError> {
        let mut style_map = StyleMap::new(self.dom);
        let mut uninlinable: Vec<&StyleBlock> = Vec::new();
        let mut warnings = Vec::new();

        for stylesheet in self.stylesheets {
            for block in stylesheet.blocks() {
                if !block.is_inlinable() {
                    uninlinable.push(block);
                    continue;
                }

                match self.dom.select(block.selector_string()) {
                    Ok(elements) => {
                        for element in elements {
                            style_map.add(element.as_node(), block.properties());
                        }
                    }
                    Err(()) => {
                        let error = MailstyleError::SelectorMatchFailure {
                            selector: block.selector_string().to_string(),
                        };
                        warn!("{} (stylesheet {:?})", error, stylesheet.name);
                        warnings.push(error);
                        uninlinable.push(block);
                    }
                }
            }
        }

        debug!("Inlining styles into {} elements", style_map.len());
        style_map.apply();

        if options.keep_uninlinable_css && !uninlinable.is_empty() {
            self.add_uninlinable_styles(&uninlinable, options);
        }

        warnings
    }

    fn add_uninlinable_styles(&self, blocks: &[&StyleBlock], options: &InlineOptions) {
        let css = render_uninlinable(blocks, options.merge_media_queries);
        let style = create_element("style", &[("type", "text/css")]);
        style.append(NodeRef::new_text(css));

        match options.target {
            UninlinableTarget::Head => match find_first(self.dom, "head") {
                Some(head) => head.append(style),
                None => fragment_root(self.dom).prepend(style),
            },
            UninlinableTarget::FragmentRoot => fragment_root(self.dom).prepend(style),
        }
    }
}

/// 把无法内联的样式块渲染成一段CSS
///
/// 合并模式下，媒体查询相同的块归入同一个 `@media` 规则，
/// 各组按首次出现的顺序排列。
pub fn render_uninlinable(blocks: &[&StyleBlock], merge_media_queries: bool) -> String {
    let mut groups: Vec<(&[String], Vec<&StyleBlock>)> = Vec::new();

    for &block in blocks {
        let media = block.media();
        let existing = if merge_media_queries {
            groups.iter_mut().find(|(group_media, _)| *group_media == media)
        } else {
            None
        };
        match existing {
            Some((_, members)) => members.push(block),
            None => groups.push((media, vec![block])),
        }
    }

    groups
        .into_iter()
        .map(|(media, members)| {
            let css = members
                .iter()
                .map(|block| block.to_css())
                .collect::<Vec<_>>()
                .join("\n");
            if media.iter().all(|query| query.eq_ignore_ascii_case("all")) {
                css
            } else {
                format!("@media {}{{\n{}\n}}", media.join(", "), css)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
