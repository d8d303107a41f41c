//! # 工具模块
//!
//! - `url` - URL选项、绝对URL生成、路径判断

pub mod url;

// Re-export commonly used items for convenience
pub use self::url::{is_template_placeholder, path_is_absolute, Url, UrlGenerator, UrlOptions};
