use std::collections::HashMap;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::{namespace_url, ns, LocalName, QualName};
use kuchiki::traits::TendrilSink;
use kuchiki::{Attribute, ExpandedName, Node, NodeRef};

/// 将 HTML 字节按给定编码解码为字符串
///
/// 无法识别的编码标签按 UTF-8 处理，非法字节会被替换。
pub fn decode_html(data: &[u8], document_encoding: &str) -> String {
    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.into_owned()
    } else {
        String::from_utf8_lossy(data).into_owned()
    }
}

/// 将完整的 HTML 文档解析为 DOM
pub fn html_to_dom(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// 将 HTML 片段解析为 DOM
///
/// 结果是一个文档节点，其唯一子元素是充当片段根的 `html` 元素，
/// 片段中的节点都挂在它下面。
pub fn fragment_to_dom(html: &str) -> NodeRef {
    let context = QualName::new(None, ns!(html), LocalName::from("body"));
    kuchiki::parse_fragment(context, Vec::new()).one(html)
}

/// 片段的根节点；对于完整文档返回文档节点本身
pub fn fragment_root(dom: &NodeRef) -> NodeRef {
    if dom.as_document().is_some() {
        if let Some(root) = dom.children().find(|child| child.as_element().is_some()) {
            return root;
        }
    }
    dom.clone()
}

/// 查找第一个匹配的元素
pub fn find_first(dom: &NodeRef, selector: &str) -> Option<NodeRef> {
    dom.select_first(selector)
        .ok()
        .map(|element| element.as_node().clone())
}

/// 获取节点名称
pub fn get_node_name(node: &NodeRef) -> Option<String> {
    node.as_element()
        .map(|element| element.name.local.to_string())
}

/// 获取节点属性值
pub fn get_node_attr(node: &NodeRef, attr_name: &str) -> Option<String> {
    node.as_element().and_then(|element| {
        element
            .attributes
            .borrow()
            .get(attr_name)
            .map(|value| value.to_string())
    })
}

/// 设置节点属性值，传入 `None` 时移除该属性
pub fn set_node_attr(node: &NodeRef, attr_name: &str, attr_value: Option<String>) {
    if let Some(element) = node.as_element() {
        let mut attributes = element.attributes.borrow_mut();
        match attr_value {
            Some(value) => {
                attributes.insert(attr_name, value);
            }
            None => {
                attributes.remove(attr_name);
            }
        }
    }
}

/// 创建一个新的 HTML 元素
pub fn create_element(name: &str, attrs: &[(&str, &str)]) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, ns!(html), LocalName::from(name)),
        attrs.iter().map(|(attr_name, value)| {
            (
                ExpandedName::new(ns!(), LocalName::from(*attr_name)),
                Attribute {
                    prefix: None,
                    value: value.to_string(),
                },
            )
        }),
    )
}

/// 整理片段根下的文本节点
///
/// 空文本节点全部去掉；只含空白的文本节点仅在开头和结尾处去掉，
/// 行内元素之间的空格会影响渲染结果，必须保留。
pub fn strip_blank_text_nodes(root: &NodeRef) {
    let is_blank = |node: &NodeRef| {
        node.as_text()
            .is_some_and(|text| text.borrow().trim().is_empty())
    };

    let empty: Vec<NodeRef> = root
        .children()
        .filter(|child| child.as_text().is_some_and(|text| text.borrow().is_empty()))
        .collect();
    for node in empty {
        node.detach();
    }

    while let Some(first) = root.first_child().filter(is_blank) {
        first.detach();
    }
    while let Some(last) = root.last_child().filter(is_blank) {
        last.detach();
    }
}

/// 元素在 [`ElementArena`] 中的编号，即文档顺序中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

/// 按文档顺序为每个元素分配稳定编号
///
/// kuchiki 的节点句柄是引用计数指针，本身不能作为有序映射的键；
/// 这里用节点地址做索引，把句柄换成可排序的编号。
pub struct ElementArena {
    nodes: Vec<NodeRef>,
    ids: HashMap<*const Node, ElementId>,
}

impl ElementArena {
    pub fn new(root: &NodeRef) -> Self {
        let nodes: Vec<NodeRef> = root
            .inclusive_descendants()
            .filter(|node| node.as_element().is_some())
            .collect();
        let ids = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (Rc::as_ptr(&node.0), ElementId(index)))
            .collect();
        ElementArena { nodes, ids }
    }

    pub fn id_of(&self, node: &NodeRef) -> Option<ElementId> {
        self.ids.get(&Rc::as_ptr(&node.0)).copied()
    }

    pub fn get(&self, id: ElementId) -> Option<&NodeRef> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
