//! # Mailstyle Library
//!
//! 把 CSS 内联到 HTML 邮件中：读取文档引用的样式表，按照层叠规则计算每个元素的样式，
//! 写进 `style` 属性，并把相对链接改写为绝对URL。
//!
//! ## 模块组织
//!
//! - `core` - 文档转换流程
//! - `style` - 选择器、声明、样式表与内联
//! - `providers` - 样式表提供者
//! - `parsers` - HTML 与 CSS 解析、链接改写
//! - `utils` - URL 生成
//! - `config` / `env` - 配置文件与环境变量
//! - `error` - 错误类型
//!
//! ## 使用示例
//!
//! ```rust
//! use mailstyle::Document;
//!
//! let html = Document::fragment("<p>Hello</p>")
//!     .with_css("p { color: green; }")
//!     .transform()
//!     .unwrap();
//! assert_eq!(html, "<p style=\"color:green\">Hello</p>");
//! ```

pub mod config;
pub mod core;
pub mod env;
pub mod error;
pub mod parsers;
pub mod providers;
pub mod style;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::MailstyleConfig;
pub use core::{Document, DocumentStructure, TransformCallback};
pub use error::{CssNotFound, MailstyleError, MailstyleResult};
pub use parsers::DocumentMode;
pub use providers::{AssetProvider, ProviderList};
pub use style::Stylesheet;
pub use utils::url::{UrlGenerator, UrlOptions};
