use std::sync::LazyLock;

use kuchiki::{NodeData, NodeRef};
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use serde::Deserialize;

use super::dom::fragment_root;
use crate::error::MailstyleResult;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").expect("placeholder pattern is valid"));

static ENCODED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)%7B%7B(?P<inner>.*?)%7D%7D").expect("encoded placeholder pattern is valid")
});

/// 没有结束标签的元素
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// 内容不转义的元素
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentMode {
    /// html5ever 的标准 HTML 序列化
    #[default]
    Html,
    /// 空元素自闭合（`<br />`），适合要求 XHTML 的邮件系统
    Xhtml,
}

/// 序列化整个文档
pub fn serialize_document(dom: &NodeRef, mode: DocumentMode) -> MailstyleResult<String> {
    let html = match mode {
        DocumentMode::Html => {
            let mut buf: Vec<u8> = Vec::new();
            dom.serialize(&mut buf)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
        DocumentMode::Xhtml => {
            let mut out = String::new();
            write_xhtml(dom, &mut out);
            out
        }
    };

    Ok(restore_placeholders(&html))
}

/// 序列化片段，只输出片段根的子节点
pub fn serialize_fragment(dom: &NodeRef, mode: DocumentMode) -> MailstyleResult<String> {
    let root = fragment_root(dom);
    let mut html = String::new();

    for child in root.children() {
        match mode {
            DocumentMode::Html => {
                let mut buf: Vec<u8> = Vec::new();
                child.serialize(&mut buf)?;
                html.push_str(&String::from_utf8_lossy(&buf));
            }
            DocumentMode::Xhtml => write_xhtml(&child, &mut html),
        }
    }

    Ok(restore_placeholders(&html))
}

/// 还原被转义的模板占位符
///
/// 序列化会把 `{{ a && b }}` 中的 `&` 转义，URL 处理会把 `{{` 编码成 `%7B%7B`，
/// 模板引擎都无法再识别它们。
pub fn restore_placeholders(html: &str) -> String {
    let html = ENCODED_PLACEHOLDER.replace_all(html, |captures: &Captures| {
        format!(
            "{{{{{}}}}}",
            percent_decode_str(&captures["inner"]).decode_utf8_lossy()
        )
    });
    PLACEHOLDER
        .replace_all(&html, |captures: &Captures| {
            captures[0]
                .replace("&amp;", "&")
                .replace("&lt;", "<")
                .replace("&gt;", ">")
        })
        .into_owned()
}

fn write_xhtml(node: &NodeRef, out: &mut String) {
    match node.data() {
        NodeData::Document(_) | NodeData::DocumentFragment => {
            for child in node.children() {
                write_xhtml(&child, out);
            }
        }
        NodeData::Doctype(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(&doctype.name);
            if !doctype.public_id.is_empty() {
                out.push_str(" PUBLIC \"");
                out.push_str(&doctype.public_id);
                out.push('"');
            }
            if !doctype.system_id.is_empty() {
                out.push_str(" \"");
                out.push_str(&doctype.system_id);
                out.push('"');
            }
            out.push('>');
        }
        NodeData::Element(element) => {
            let tag: &str = &element.name.local;
            out.push('<');
            out.push_str(tag);

            for (name, attribute) in element.attributes.borrow().map.iter() {
                out.push(' ');
                if let Some(prefix) = &attribute.prefix {
                    out.push_str(prefix);
                    out.push(':');
                }
                out.push_str(&name.local);
                out.push_str("=\"");
                escape_xml_attr(&attribute.value, out);
                out.push('"');
            }

            if VOID_ELEMENTS.contains(&tag) {
                out.push_str(" />");
                return;
            }
            out.push('>');

            let raw = RAW_TEXT_ELEMENTS.contains(&tag);
            for child in node.children() {
                match child.as_text() {
                    Some(text) if raw => out.push_str(&text.borrow()),
                    _ => write_xhtml(&child, out),
                }
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeData::Text(text) => escape_xml_text(&text.borrow(), out),
        NodeData::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.borrow());
            out.push_str("-->");
        }
        NodeData::ProcessingInstruction(_) => {}
    }
}

fn escape_xml_attr(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn escape_xml_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
