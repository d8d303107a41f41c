//! 选择器与特异性

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parsers::css::calculate_specificity;

/// 每一位最多计数到 1023
const COMPONENT_MAX: u32 = (1 << 10) - 1;

/// 无法写进 style 属性的动态伪类
const DYNAMIC_PSEUDO_CLASSES: &[&str] = &[
    ":active",
    ":focus",
    ":hover",
    ":link",
    ":target",
    ":visited",
    ":-ms-input-placeholder",
    ":-moz-placeholder",
    ":before",
    ":after",
    ":enabled",
    ":disabled",
    ":checked",
];

/// 选择器特异性
///
/// 按 (id, class, type) 三位打包进一个 `u32`，每位 10 比特，
/// 因此可以直接按整数比较大小。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(u32);

impl Specificity {
    pub fn new(ids: u32, classes: u32, types: u32) -> Self {
        Specificity(
            ids.min(COMPONENT_MAX) << 20
                | classes.min(COMPONENT_MAX) << 10
                | types.min(COMPONENT_MAX),
        )
    }

    /// 拆回 (id, class, type) 三元组
    pub fn components(self) -> (u32, u32, u32) {
        (
            self.0 >> 20,
            (self.0 >> 10) & COMPONENT_MAX,
            self.0 & COMPONENT_MAX,
        )
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b, c) = self.components();
        write!(f, "{},{},{}", a, b, c)
    }
}

/// 一个 CSS 选择器
///
/// 文本会去掉首尾空白。两个选择器只要文本相同就相等，
/// 与显式指定的特异性无关。
#[derive(Debug, Clone)]
pub struct Selector {
    selector: String,
    specificity: Specificity,
}

impl Selector {
    pub fn new(selector: &str) -> Self {
        let selector = selector.trim();
        Selector {
            selector: selector.to_string(),
            specificity: calculate_specificity(selector),
        }
    }

    /// 使用调用方给定的特异性，而不是计算出的值
    pub fn with_specificity(selector: &str, specificity: Specificity) -> Self {
        Selector {
            selector: selector.trim().to_string(),
            specificity,
        }
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    pub fn as_str(&self) -> &str {
        &self.selector
    }

    /// 选择器能否写进元素的 style 属性
    ///
    /// 伪元素、at-rule 以及依赖交互状态的伪类都不能内联。
    pub fn is_inlinable(&self) -> bool {
        !(self.is_pseudo_element() || self.is_at_rule() || self.has_dynamic_pseudo_class())
    }

    fn is_pseudo_element(&self) -> bool {
        self.selector.contains("::")
    }

    fn is_at_rule(&self) -> bool {
        self.selector.starts_with('@')
    }

    fn has_dynamic_pseudo_class(&self) -> bool {
        let lowercase = self.selector.to_ascii_lowercase();
        DYNAMIC_PSEUDO_CLASSES
            .iter()
            .any(|pseudo| lowercase.contains(pseudo))
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.selector == other.selector
    }
}

impl Eq for Selector {}

impl Hash for Selector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.selector.hash(state);
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)
    }
}

impl From<&str> for Selector {
    fn from(selector: &str) -> Self {
        Selector::new(selector)
    }
}
