//! 单条 CSS 声明

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::Specificity;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^\s*(?P<property>[-_a-zA-Z0-9*]+)\s*:\s*(?P<value>.+?)\s*(?P<important>!\s*(?i:important))?\s*$",
    )
    .expect("declaration pattern is valid")
});

/// 一条声明：属性名、值、是否 `!important`，以及来源规则的特异性
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleProperty {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub specificity: Specificity,
}

impl StyleProperty {
    pub fn new(
        property: impl Into<String>,
        value: impl Into<String>,
        important: bool,
        specificity: Specificity,
    ) -> Self {
        StyleProperty {
            property: property.into(),
            value: value.into(),
            important,
            specificity,
        }
    }

    /// 解析 `property: value [!important]` 形式的声明
    ///
    /// 无法解析时返回 `None`，由调用方决定错误信息。
    pub fn parse(declaration: &str, specificity: Specificity) -> Option<Self> {
        let captures = DECLARATION.captures(declaration)?;
        let property = captures.name("property")?.as_str();
        let value = captures.name("value")?.as_str().trim();
        if value.is_empty() {
            return None;
        }

        Some(StyleProperty::new(
            property,
            value,
            captures.name("important").is_some(),
            specificity,
        ))
    }

    /// 用于比较两条同名声明谁胜出
    ///
    /// `!important` 优先，其次比较特异性。
    pub fn precedence(&self) -> (bool, Specificity) {
        (self.important, self.specificity)
    }

    /// 是否与另一条声明设置同一个属性
    pub fn same_property(&self, other: &StyleProperty) -> bool {
        self.property.eq_ignore_ascii_case(&other.property)
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}
