//! CSS 解析器模块
//!
//! 此模块基于 cssparser 的底层记号（token）接口，把样式表切分为规则，
//! 计算选择器的特异性，并重写声明中的 `url()` 引用。
//!
//! # 主要功能
//!
//! - **规则切分**: 把样式表拆成普通规则和 at-rule，`@media` 规则会展开并记录媒体查询
//! - **选择器列表**: 按顶层逗号拆分选择器列表，括号和属性选择器内部的逗号不受影响
//! - **特异性**: 按 (id, class, type) 三元组计算选择器特异性
//! - **声明切分**: 按顶层分号拆分声明块，尊重引号和括号
//! - **URL重写**: 处理 `url()` 函数中的资源引用
//!
//! # 使用示例
//!
//! ```rust
//! use mailstyle::parsers::css::{parse_rules, CssRule};
//!
//! let rules = parse_rules("a, b { color: red } @media print { p { margin: 0 } }");
//! assert_eq!(rules.len(), 2);
//! ```

use std::sync::LazyLock;

use cssparser::{ParseError, Parser, ParserInput, SourcePosition, Token};
use regex::{Captures, Regex};

use crate::error::MailstyleResult;
use crate::style::Specificity;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("comment pattern is valid"));

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)url\(\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<uq>(?:[^()"'\s]|\([^()]*\))+))\s*\)"#,
    )
    .expect("url pattern is valid")
});

/// 旧式伪元素可以只写一个冒号
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// 从样式表中切分出的一条规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssRule {
    /// 普通规则：`选择器列表 { 声明块 }`
    Style {
        selectors: String,
        declarations: String,
        media: Vec<String>,
    },
    /// 除 `@media` 以外的 at-rule，原样保留
    AtRule {
        prelude: String,
        body: Option<String>,
        media: Vec<String>,
    },
}

/// 把样式表切分成规则列表
///
/// 注释会被丢弃，`@charset` 会被忽略，`@media` 块内部的规则会携带对应的媒体查询。
/// 没有声明块的残缺规则会被跳过。
pub fn parse_rules(css: &str) -> Vec<CssRule> {
    let css = strip_comments(css);
    let mut input = ParserInput::new(&css);
    let mut parser = Parser::new(&mut input);

    let mut rules = Vec::new();
    collect_rules(&mut parser, &[], &mut rules);
    rules
}

fn collect_rules<'i>(parser: &mut Parser<'i, '_>, media: &[String], rules: &mut Vec<CssRule>) {
    loop {
        parser.skip_whitespace();
        let start = parser.position();
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::CDO | Token::CDC | Token::Semicolon | Token::CloseCurlyBracket => continue,
            Token::AtKeyword(name) => {
                let prelude_start = parser.position();
                let (prelude_end, has_block) = skip_to_block(parser);
                let prelude = parser.slice(prelude_start..prelude_end).trim().to_string();

                if name.eq_ignore_ascii_case("charset") {
                    if has_block {
                        let _ = block_contents(parser);
                    }
                    continue;
                }

                if has_block && name.eq_ignore_ascii_case("media") {
                    let queries = nest_media_queries(media, &split_comma_list(&prelude));
                    let _ = parser.parse_nested_block(|nested| {
                        collect_rules(nested, &queries, rules);
                        Ok::<(), ParseError<'i, ()>>(())
                    });
                    continue;
                }

                let prelude = if prelude.is_empty() {
                    format!("@{}", name)
                } else {
                    format!("@{} {}", name, prelude)
                };
                let body = if has_block {
                    Some(block_contents(parser))
                } else {
                    None
                };
                rules.push(CssRule::AtRule {
                    prelude,
                    body,
                    media: media.to_vec(),
                });
            }
            Token::CurlyBracketBlock => {
                // 没有选择器的声明块
                let _ = block_contents(parser);
            }
            token => {
                skip_nested_block(parser, &token);
                let (prelude_end, has_block) = skip_to_block(parser);
                if !has_block {
                    continue;
                }
                let selectors = parser.slice(start..prelude_end).trim().to_string();
                let declarations = block_contents(parser);
                rules.push(CssRule::Style {
                    selectors,
                    declarations,
                    media: media.to_vec(),
                });
            }
        }
    }
}

/// 前进到下一个 `{` 块或 `;`，返回块之前的位置以及是否遇到了块
fn skip_to_block<'i>(parser: &mut Parser<'i, '_>) -> (SourcePosition, bool) {
    loop {
        let before = parser.position();
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => return (parser.position(), false),
        };
        match token {
            Token::CurlyBracketBlock => return (before, true),
            Token::Semicolon => return (before, false),
            token => skip_nested_block(parser, &token),
        }
    }
}

/// 跳过刚刚打开的 `(`、`[` 或函数块，使位置停在对应的右括号之后
fn skip_nested_block<'i>(parser: &mut Parser<'i, '_>, token: &Token<'i>) {
    if matches!(
        token,
        Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock
    ) {
        let _ = parser.parse_nested_block(|nested| {
            while nested.next().is_ok() {}
            Ok::<(), ParseError<'i, ()>>(())
        });
    }
}

/// 嵌套的 `@media` 需要同时满足外层和内层条件
pub fn nest_media_queries(outer: &[String], inner: &[String]) -> Vec<String> {
    if outer.is_empty() {
        return inner.to_vec();
    }
    if inner.is_empty() {
        return outer.to_vec();
    }

    let mut queries = Vec::with_capacity(outer.len() * inner.len());
    for outer in outer {
        for inner in inner {
            let query = if outer.eq_ignore_ascii_case("all") {
                inner.clone()
            } else if inner.eq_ignore_ascii_case("all") {
                outer.clone()
            } else {
                format!("{} and {}", outer, inner)
            };
            queries.push(query);
        }
    }
    queries
}

/// 读取刚刚消费的块的原始内容
fn block_contents<'i>(parser: &mut Parser<'i, '_>) -> String {
    parser
        .parse_nested_block(|nested| {
            let start = nested.position();
            while nested.next_including_whitespace_and_comments().is_ok() {}
            Ok::<String, ParseError<'i, ()>>(nested.slice_from(start).trim().to_string())
        })
        .unwrap_or_default()
}

/// 按顶层逗号拆分列表（选择器列表、媒体查询列表）
pub fn split_comma_list(text: &str) -> Vec<String> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);

    parser
        .parse_comma_separated(|item| {
            let start = item.position();
            while item.next().is_ok() {}
            Ok::<String, ParseError<'_, ()>>(item.slice_from(start).trim().to_string())
        })
        .unwrap_or_default()
        .into_iter()
        .filter(|item| !item.is_empty())
        .collect()
}

/// 计算选择器特异性
///
/// id 计入第一位；类、属性选择器和伪类计入第二位；类型选择器和伪元素计入第三位。
/// `:not()`、`:is()` 和 `:has()` 取其参数中特异性最高者，`:where()` 不计分。
pub fn calculate_specificity(selector: &str) -> Specificity {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let (ids, classes, types) = count_selector(&mut parser);
    Specificity::new(ids, classes, types)
}

fn count_selector<'i>(parser: &mut Parser<'i, '_>) -> (u32, u32, u32) {
    let (mut ids, mut classes, mut types) = (0, 0, 0);
    let mut colons = 0;
    let mut after_dot = false;

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::Delim('.') => {
                after_dot = true;
                continue;
            }
            Token::Colon => {
                colons += 1;
                continue;
            }
            Token::IDHash(_) | Token::Hash(_) => ids += 1,
            Token::SquareBracketBlock => classes += 1,
            Token::Ident(name) => {
                if after_dot {
                    classes += 1;
                } else if colons == 1 {
                    let legacy = LEGACY_PSEUDO_ELEMENTS
                        .iter()
                        .any(|element| name.eq_ignore_ascii_case(element));
                    if legacy {
                        types += 1;
                    } else {
                        classes += 1;
                    }
                } else {
                    types += 1;
                }
            }
            Token::Function(name) => {
                if colons >= 2 {
                    types += 1;
                } else if colons == 1 {
                    let name = name.to_ascii_lowercase();
                    match name.as_str() {
                        "where" => {}
                        "not" | "is" | "matches" | "has" | "-moz-any" | "-webkit-any" => {
                            let (a, b, c) = highest_argument(parser);
                            ids += a;
                            classes += b;
                            types += c;
                        }
                        _ => classes += 1,
                    }
                }
            }
            _ => {}
        }

        after_dot = false;
        colons = 0;
    }

    (ids, classes, types)
}

fn highest_argument<'i>(parser: &mut Parser<'i, '_>) -> (u32, u32, u32) {
    parser
        .parse_nested_block(|nested| {
            nested.parse_comma_separated(|argument| {
                Ok::<(u32, u32, u32), ParseError<'i, ()>>(count_selector(argument))
            })
        })
        .unwrap_or_default()
        .into_iter()
        .max_by_key(|&(a, b, c)| Specificity::new(a, b, c))
        .unwrap_or_default()
}

/// 按顶层分号拆分声明块
///
/// 引号和括号内的分号（例如 data URI 中的分号）不会被当作分隔符。
pub fn split_declarations(block: &str) -> Vec<String> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut escaped = false;

    for c in block.chars() {
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' | '\'' => match quote {
                Some(open) if open == c => quote = None,
                None => quote = Some(c),
                _ => {}
            },
            '(' if quote.is_none() => depth += 1,
            ')' if quote.is_none() => depth = depth.saturating_sub(1),
            ';' if quote.is_none() && depth == 0 => {
                let declaration = current.trim();
                if !declaration.is_empty() {
                    declarations.push(declaration.to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    let declaration = current.trim();
    if !declaration.is_empty() {
        declarations.push(declaration.to_string());
    }

    declarations
}

/// 去掉 CSS 注释
pub fn strip_comments(css: &str) -> String {
    COMMENT.replace_all(css, "").into_owned()
}

/// 重写 CSS 中每一个 `url()` 引用
///
/// 引号风格保持不变。回调返回错误时整个重写失败。
///
/// # 参数
///
/// * `css` - 声明文本或整个样式表
/// * `rewrite` - 接收原始引用，返回新的引用
pub fn rewrite_css_urls<F>(css: &str, mut rewrite: F) -> MailstyleResult<String>
where
    F: FnMut(&str) -> MailstyleResult<String>,
{
    let mut result = String::with_capacity(css.len());
    let mut last = 0;

    for captures in CSS_URL.captures_iter(css) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let (quote, reference) = url_reference(&captures);

        result.push_str(&css[last..whole.start()]);
        result.push_str("url(");
        result.push_str(quote);
        result.push_str(&rewrite(reference)?);
        result.push_str(quote);
        result.push(')');
        last = whole.end();
    }

    result.push_str(&css[last..]);
    Ok(result)
}

fn url_reference<'c>(captures: &Captures<'c>) -> (&'static str, &'c str) {
    if let Some(reference) = captures.name("dq") {
        ("\"", reference.as_str())
    } else if let Some(reference) = captures.name("sq") {
        ("'", reference.as_str())
    } else {
        ("", captures.name("uq").map_or("", |reference| reference.as_str()))
    }
}
