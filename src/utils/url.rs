//! URL处理工具
//!
//! [`UrlGenerator`] 根据 [`UrlOptions`] 把文档中的相对路径变成绝对URL。

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
pub use url::Url;

use crate::error::{MailstyleError, MailstyleResult};

static ABSOLUTE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+:|//)").expect("absolute path pattern is valid"));

static SCHEMELESS_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//\w").expect("schemeless path pattern is valid"));

static TEMPLATE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\{\{|%7B%7B)").expect("placeholder pattern is valid"));

const VALID_OPTIONS: &str = "host, port, scheme, protocol, path";

/// 生成绝对URL所需的参数
///
/// `host` 必填；`scheme` 默认为 `http`，也可以写作 `protocol`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlOptions {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "protocol")]
    pub scheme: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl UrlOptions {
    pub fn new(host: impl Into<String>) -> Self {
        UrlOptions {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 从 `key=value` 键值对构造选项，未知的键会被拒绝
    pub fn from_pairs<I, K, V>(pairs: I) -> MailstyleResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = UrlOptions::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "host" => options.host = value,
                "port" => {
                    let port = value.trim().parse().map_err(|_| {
                        MailstyleError::InvalidUrlOptions(format!("Invalid port: {}", value))
                    })?;
                    options.port = Some(port);
                }
                "scheme" | "protocol" => options.scheme = Some(value),
                "path" => options.path = Some(value),
                other => {
                    return Err(MailstyleError::InvalidUrlOptions(format!(
                        "Passed invalid option: {}. Valid options: {}",
                        other, VALID_OPTIONS
                    )))
                }
            }
        }
        Ok(options)
    }
}

/// 判断路径是否是绝对URL
///
/// 以协议（`https:`、`data:`、`mailto:` …）或 `//` 开头的路径视为绝对路径。
/// 无法判断的输入（例如以 `:` 开头）返回 [`MailstyleError::InvalidUrlPath`]。
pub fn path_is_absolute(path: &str) -> MailstyleResult<bool> {
    if ABSOLUTE_PATH.is_match(path) {
        return Ok(true);
    }
    if path.starts_with(':') {
        return Err(MailstyleError::InvalidUrlPath {
            path: path.to_string(),
            reason: "missing scheme before ':'".to_string(),
        });
    }

    match Url::parse(path) {
        Ok(_) => Ok(true),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(false),
        Err(error) => Err(MailstyleError::InvalidUrlPath {
            path: path.to_string(),
            reason: error.to_string(),
        }),
    }
}

/// 是否是模板占位符（`{{ ... }}`），这类值不应被改写
pub fn is_template_placeholder(path: &str) -> bool {
    TEMPLATE_PLACEHOLDER.is_match(path.trim_start())
}

/// 根据主机、端口、协议和根路径生成绝对URL
#[derive(Debug, Clone)]
pub struct UrlGenerator {
    url_options: UrlOptions,
    scheme: String,
    root: Url,
}

impl UrlGenerator {
    pub fn new(url_options: UrlOptions) -> MailstyleResult<Self> {
        if url_options.host.trim().is_empty() {
            return Err(MailstyleError::InvalidUrlOptions(format!(
                "No host was specified. Valid options: {}",
                VALID_OPTIONS
            )));
        }

        let scheme = normalize_scheme(url_options.scheme.as_deref());
        let mut root = Url::parse(&format!("{}://{}/", scheme, url_options.host.trim()))
            .map_err(|error| MailstyleError::InvalidUrlOptions(format!("Invalid host: {}", error)))?;
        if let Some(port) = url_options.port {
            root.set_port(Some(port)).map_err(|_| {
                MailstyleError::InvalidUrlOptions(format!("Cannot use port {} with {}", port, scheme))
            })?;
        }
        if let Some(path) = url_options.path.as_deref() {
            root.set_path(&squeeze_slashes(&format!("/{}", path)));
        }

        Ok(UrlGenerator {
            url_options,
            scheme,
            root,
        })
    }

    pub fn url_options(&self) -> &UrlOptions {
        &self.url_options
    }

    /// 生成绝对URL
    ///
    /// 空路径返回根URL。锚点、模板占位符和已经是绝对URL的路径原样返回；
    /// 以 `//` 开头的路径补上协议。`base` 只对不以 `/` 开头的路径生效，
    /// 用于相对于样式表所在目录解析。
    pub fn generate(&self, path: &str, base: &str) -> MailstyleResult<String> {
        if path.is_empty() {
            return Ok(self.root.to_string());
        }
        if path.starts_with('#') || is_template_placeholder(path) {
            return Ok(path.to_string());
        }
        if SCHEMELESS_PATH.is_match(path) {
            return Ok(format!("{}:{}", self.scheme, path));
        }
        if path_is_absolute(path)? {
            return Ok(path.to_string());
        }

        let offset = if path.starts_with('/') { "" } else { base };
        let combined = join_path(&[self.root.path(), offset, path]);
        let url = self
            .root
            .join(&combined)
            .map_err(|error| MailstyleError::InvalidUrlPath {
                path: path.to_string(),
                reason: error.to_string(),
            })?;

        Ok(url.to_string())
    }
}

impl fmt::Display for UrlGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root.as_str())
    }
}

fn normalize_scheme(scheme: Option<&str>) -> String {
    let scheme = scheme
        .map(|scheme| scheme.trim().trim_end_matches(['/', ':']))
        .filter(|scheme| !scheme.is_empty())
        .unwrap_or("http");
    scheme.to_ascii_lowercase()
}

/// 用 `/` 连接路径片段，并把路径部分的连续斜杠压缩成一个
///
/// 查询串和片段标识符保持不变。
fn join_path(parts: &[&str]) -> String {
    let joined = format!("/{}", parts.join("/"));
    let split_at = joined.find(['?', '#']).unwrap_or(joined.len());
    let (path, rest) = joined.split_at(split_at);
    format!("{}{}", squeeze_slashes(path), rest)
}

fn squeeze_slashes(path: &str) -> String {
    let mut squeezed = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && squeezed.ends_with('/') {
            continue;
        }
        squeezed.push(c);
    }
    squeezed
}
