//! 样式模型与内联
//!
//! 选择器、声明、样式块和样式表构成只读的样式模型；
//! [`StyleMap`] 和 [`Inliner`] 负责把它们写进 DOM。

pub mod block;
pub mod deduplicator;
pub mod inliner;
pub mod property;
pub mod selector;
pub mod style_map;
pub mod stylesheet;

pub use block::StyleBlock;
pub use deduplicator::deduplicate;
pub use inliner::{InlineOptions, Inliner, UninlinableTarget};
pub use property::StyleProperty;
pub use selector::{Selector, Specificity};
pub use style_map::{StyleAttributeBuilder, StyleMap};
pub use stylesheet::Stylesheet;
