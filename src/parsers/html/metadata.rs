//! 文档结构修正
//!
//! 邮件客户端对残缺文档的容忍度各不相同，这里补齐 doctype、`<head>`
//! 以及声明字符集的 `<meta>`。

use std::sync::LazyLock;

use kuchiki::NodeRef;
use regex::Regex;

use super::dom::{create_element, find_first, get_node_attr, get_node_name};

static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype\s").expect("doctype pattern is valid"));

const CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// 修正文档结构
///
/// 多次调用结果相同：已经存在的 doctype、`<head>` 和 Content-Type 声明不会重复添加。
pub struct MarkupImprover<'a> {
    dom: &'a NodeRef,
    original_html: &'a str,
}

impl<'a> MarkupImprover<'a> {
    pub fn new(dom: &'a NodeRef, original_html: &'a str) -> Self {
        MarkupImprover { dom, original_html }
    }

    pub fn improve(&self) {
        self.ensure_doctype();
        if let Some(head) = self.ensure_head_element() {
            self.ensure_declared_charset(&head);
        }
    }

    /// 原始 HTML 没有 doctype 时补上 `<!DOCTYPE html>`
    fn ensure_doctype(&self) {
        if DOCTYPE.is_match(self.original_html) || self.has_doctype_node() {
            return;
        }
        self.dom.prepend(NodeRef::new_doctype("html", "", ""));
    }

    fn has_doctype_node(&self) -> bool {
        self.dom.children().any(|child| child.as_doctype().is_some())
    }

    /// 返回 `<head>`，必要时在 `<html>` 中创建
    fn ensure_head_element(&self) -> Option<NodeRef> {
        if let Some(head) = find_first(self.dom, "head") {
            return Some(head);
        }

        let html = find_first(self.dom, "html")?;
        let head = create_element("head", &[]);
        match html
            .children()
            .find(|child| get_node_name(child).as_deref() == Some("body"))
        {
            Some(body) => body.insert_before(head.clone()),
            None => html.prepend(head.clone()),
        }
        Some(head)
    }

    fn ensure_declared_charset(&self, head: &NodeRef) {
        let declared = head
            .inclusive_descendants()
            .filter(|node| get_node_name(node).as_deref() == Some("meta"))
            .any(|meta| {
                get_node_attr(&meta, "http-equiv")
                    .is_some_and(|value| value.trim().eq_ignore_ascii_case("content-type"))
            });
        if declared {
            return;
        }

        head.prepend(create_element(
            "meta",
            &[("http-equiv", "Content-Type"), ("content", CONTENT_TYPE)],
        ));
    }
}
