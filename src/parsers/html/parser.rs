//! HTML 属性解析
//!
//! 解析 `<link>` 元素的 `rel` 属性，以及 `<style>`/`<link>` 的 `media` 属性，
//! 用来判断一个元素是否引入了可以内联的样式表。
//!
//! ## 使用示例
//!
//! ```rust
//! use mailstyle::parsers::html::parser::{parse_link_type, LinkType};
//!
//! let link_types = parse_link_type("alternate stylesheet");
//! assert_eq!(link_types, vec![LinkType::Alternate, LinkType::Stylesheet]);
//! ```

use crate::parsers::css::split_comma_list;

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 屏幕上渲染时生效的媒体类型
const SCREEN_MEDIA: &[&str] = &["all", "screen"];

/// HTML链接类型枚举
///
/// 只区分与样式表有关的几种 `rel` 值，其余的都归为 `Other`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// 备用样式表，不参与内联
    Alternate,
    /// 预加载资源
    Preload,
    /// CSS样式表
    Stylesheet,
    /// 其他关系（icon、canonical 等）
    Other,
}

/// 解析HTML链接的rel属性值
///
/// 支持多个空白分隔的值，不区分大小写。
///
/// ## 参数
///
/// - `link_attr_rel_value`: `<link>` 元素的 `rel` 属性值字符串
///
/// ## 返回值
///
/// 按出现顺序返回每个值对应的 `LinkType`。
pub fn parse_link_type(link_attr_rel_value: &str) -> Vec<LinkType> {
    link_attr_rel_value
        .split(WHITESPACES)
        .filter(|link_attr_rel_type| !link_attr_rel_type.is_empty())
        .map(|link_attr_rel_type| {
            if link_attr_rel_type.eq_ignore_ascii_case("alternate") {
                LinkType::Alternate
            } else if link_attr_rel_type.eq_ignore_ascii_case("preload") {
                LinkType::Preload
            } else if link_attr_rel_type.eq_ignore_ascii_case("stylesheet") {
                LinkType::Stylesheet
            } else {
                LinkType::Other
            }
        })
        .collect()
}

/// `rel` 是否声明了一个会被应用的样式表
pub fn is_active_stylesheet(link_attr_rel_value: &str) -> bool {
    let link_types = parse_link_type(link_attr_rel_value);
    link_types.contains(&LinkType::Stylesheet) && !link_types.contains(&LinkType::Alternate)
}

/// `media` 属性是否在屏幕上生效
///
/// 空值视为 `all`。列表中任意一项以 `all` 或 `screen` 开头即生效，
/// 例如 `screen and (max-width: 600px)`。
pub fn media_applies_to_screen(media: &str) -> bool {
    let media = media.trim();
    if media.is_empty() {
        return true;
    }

    media.split(',').any(|query| {
        let media_type = query
            .split(WHITESPACES)
            .find(|word| !word.is_empty() && !word.eq_ignore_ascii_case("only"))
            .unwrap_or("all");
        media_type.starts_with('(')
            || SCREEN_MEDIA
                .iter()
                .any(|screen| media_type.eq_ignore_ascii_case(screen))
    })
}

/// 元素 `media` 属性带来的限制条件
///
/// 只要有一项是不带条件的 `all` 或 `screen`，样式表就总是生效，返回空列表；
/// 否则返回全部查询，例如 `screen and (max-width: 600px)`。
pub fn media_qualifiers(media: &str) -> Vec<String> {
    let queries = split_comma_list(media);
    let unconditional = queries.iter().any(|query| {
        let words: Vec<&str> = query
            .split(WHITESPACES)
            .filter(|word| !word.is_empty() && !word.eq_ignore_ascii_case("only"))
            .collect();
        matches!(words.as_slice(), [media_type] if SCREEN_MEDIA
            .iter()
            .any(|screen| media_type.eq_ignore_ascii_case(screen)))
    });

    if unconditional {
        Vec::new()
    } else {
        queries
    }
}
