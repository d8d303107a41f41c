//! 按元素累积声明，并最终写回 style 属性

use std::collections::BTreeMap;

use kuchiki::NodeRef;

use super::{deduplicate, StyleProperty};
use crate::parsers::html::dom::{get_node_attr, set_node_attr, ElementArena, ElementId};

/// 单个元素上累积的声明
///
/// 同名属性只保留一条：新声明的优先级不低于已有声明时替换它，
/// 并移到末尾。
#[derive(Debug, Clone, Default)]
pub struct StyleAttributeBuilder {
    properties: Vec<StyleProperty>,
}

impl StyleAttributeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: StyleProperty) {
        match self
            .properties
            .iter()
            .position(|existing| existing.same_property(&property))
        {
            Some(index) => {
                if property.precedence() >= self.properties[index].precedence() {
                    self.properties.remove(index);
                    self.properties.push(property);
                }
            }
            None => self.properties.push(property),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn properties(&self) -> &[StyleProperty] {
        &self.properties
    }

    /// 渲染为 style 属性值
    ///
    /// 按优先级稳定排序，相同优先级保持加入顺序。
    pub fn attribute_string(&self) -> String {
        let mut sorted = self.properties.clone();
        sorted.sort_by_key(StyleProperty::precedence);

        deduplicate(sorted.iter().map(ToString::to_string).collect()).join(";")
    }
}

/// 元素到声明的映射
///
/// 以元素在文档中的位置为键，因此写回时按文档顺序进行。
pub struct StyleMap {
    arena: ElementArena,
    styles: BTreeMap<ElementId, StyleAttributeBuilder>,
}

impl StyleMap {
    pub fn new(root: &NodeRef) -> Self {
        StyleMap {
            arena: ElementArena::new(root),
            styles: BTreeMap::new(),
        }
    }

    /// 为元素追加声明；不在树中的节点会被忽略
    pub fn add(&mut self, element: &NodeRef, properties: &[StyleProperty]) {
        let Some(id) = self.arena.id_of(element) else {
            return;
        };
        let builder = self.styles.entry(id).or_default();
        for property in properties {
            builder.add(property.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// 把累积的声明写进各元素的 style 属性
    ///
    /// 计算出的样式放在前面，元素原有的 style 内容原样保留在后面。
    pub fn apply(self) {
        for (id, builder) in &self.styles {
            if builder.is_empty() {
                continue;
            }
            let Some(element) = self.arena.get(*id) else {
                continue;
            };

            let computed = builder.attribute_string();
            let style = match get_node_attr(element, "style") {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{};{}", computed, existing)
                }
                _ => computed,
            };
            set_node_attr(element, "style", Some(style));
        }
    }
}
