//! 统一错误处理
//!
//! 整个库只有一个错误枚举 [`MailstyleError`]。样式表查找失败单独建模为
//! [`CssNotFound`]，这样提供者（provider）可以在不依赖外层枚举的情况下
//! 构造、聚合并检查查找错误。

use std::fmt;

use thiserror::Error;

/// 库中所有可能出现的错误
#[derive(Error, Debug)]
pub enum MailstyleError {
    /// 按名称请求的样式表无法被提供者（或提供者链）找到
    #[error(transparent)]
    CssNotFound(#[from] CssNotFound),

    /// CSS 声明无法解析，总是向上传播
    #[error("Cannot parse declaration {declaration:?} in stylesheet {stylesheet:?}")]
    MalformedDeclaration {
        declaration: String,
        stylesheet: String,
    },

    /// 路径既不能识别为绝对URL也不能识别为相对路径
    #[error("Cannot parse path {path:?}: {reason}")]
    InvalidUrlPath { path: String, reason: String },

    /// URL选项缺失或包含未知的键
    #[error("{0}")]
    InvalidUrlOptions(String),

    /// 选择器无法在DOM上求值；内联过程会跳过它并记录警告
    #[error("Cannot use selector {selector:?} when inlining stylesheets")]
    SelectorMatchFailure { selector: String },

    /// 配置文件或环境变量无效
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type MailstyleResult<T> = Result<T, MailstyleError>;

impl MailstyleError {
    /// 是否是“找不到样式表”这一类错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, MailstyleError::CssNotFound(_))
    }
}

/// 样式表查找失败
///
/// 记录被请求的名称、可读的失败原因以及失败的提供者描述。
/// 由 [`ProviderList`](crate::providers::ProviderList) 产生的聚合错误还会在
/// `failures` 中保存每个成员各自的失败信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssNotFound {
    pub css_name: String,
    pub reason: String,
    pub provider: String,
    pub failures: Vec<CssNotFound>,
}

impl CssNotFound {
    pub fn new(
        css_name: impl Into<String>,
        reason: impl Into<String>,
        provider: impl fmt::Display,
    ) -> Self {
        CssNotFound {
            css_name: css_name.into(),
            reason: reason.into(),
            provider: provider.to_string(),
            failures: Vec::new(),
        }
    }

    /// 构造一个聚合了所有成员失败信息的错误
    pub fn aggregate(
        css_name: impl Into<String>,
        provider: impl fmt::Display,
        failures: Vec<CssNotFound>,
    ) -> Self {
        let mut reason = String::from("All providers failed");
        for failure in &failures {
            reason.push_str("\n\t");
            reason.push_str(&failure.provider.replace('\n', "\n\t"));
            reason.push_str(": ");
            reason.push_str(&failure.reason.replace('\n', "\n\t"));
        }

        CssNotFound {
            css_name: css_name.into(),
            reason,
            provider: provider.to_string(),
            failures,
        }
    }
}

impl fmt::Display for CssNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not find stylesheet {:?}", self.css_name)?;
        if !self.reason.is_empty() {
            write!(f, ": {}", self.reason)?;
        }
        write!(f, "\nUsed provider:\n{}", self.provider)
    }
}

impl std::error::Error for CssNotFound {}
