//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（基于 kuchiki）
//! - `parser`: `rel` 与 `media` 属性解析
//! - `assets`: 收集文档中的样式表
//! - `metadata`: 文档结构修正
//! - `serializer`: 序列化功能

pub mod assets;
pub mod dom;
pub mod metadata;
pub mod parser;
pub mod serializer;

// 重新导出主要的公共 API
pub use assets::{remove_ignore_markers, AssetScanner, IGNORE_ATTRIBUTE};
pub use dom::{
    create_element, find_first, fragment_root, fragment_to_dom, get_node_attr, get_node_name,
    html_to_dom, set_node_attr,
};
pub use metadata::MarkupImprover;
pub use parser::{parse_link_type, LinkType};
pub use serializer::{restore_placeholders, serialize_document, serialize_fragment, DocumentMode};
