//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、样式表收集、结构修正与序列化
//! - `css` - CSS规则切分、特异性计算、`url()` 重写
//! - `link_rewriter` - 把相对链接改写为绝对URL

pub mod css;
pub mod html;
pub mod link_rewriter;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, serialize_document, DocumentMode};
pub use link_rewriter::{NullUrlRewriter, UrlRewrite, UrlRewriter};
