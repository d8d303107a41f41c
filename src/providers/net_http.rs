use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use super::{optional, AssetProvider};
use crate::env::{network, EnvVar};
use crate::error::{CssNotFound, MailstyleError, MailstyleResult};
use crate::style::Stylesheet;

/// 错误信息中最多展示的响应体字符数
const BODY_PREVIEW_CHARS: usize = 50;

/// [`NetHttpProvider`] 的配置
#[derive(Debug, Clone)]
pub struct NetHttpOptions {
    /// 允许访问的主机；为空表示不限制
    pub whitelist: Vec<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for NetHttpOptions {
    fn default() -> Self {
        NetHttpOptions {
            whitelist: Vec::new(),
            timeout: network::HttpTimeout::get_or_default(Duration::from_secs(10)),
            user_agent: network::UserAgent::get_or_default(format!(
                "mailstyle/{}",
                env!("CARGO_PKG_VERSION")
            )),
        }
    }
}

impl NetHttpOptions {
    pub fn with_whitelist<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// 通过 HTTP(S) 下载样式表
///
/// 以 `//` 开头的地址按 `https:` 处理。设置了白名单时，只访问白名单中的主机。
pub struct NetHttpProvider {
    client: Client,
    whitelist: BTreeSet<String>,
}

impl NetHttpProvider {
    pub fn new(options: NetHttpOptions) -> MailstyleResult<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .build()?;
        let whitelist = options
            .whitelist
            .into_iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();

        Ok(NetHttpProvider { client, whitelist })
    }

    pub fn whitelist(&self) -> impl Iterator<Item = &str> {
        self.whitelist.iter().map(String::as_str)
    }

    fn not_found(&self, name: &str, reason: impl Into<String>) -> MailstyleError {
        CssNotFound::new(name, reason, self).into()
    }

    fn fetch(&self, name: &str, url: Url) -> MailstyleResult<String> {
        debug!("Fetching stylesheet {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|error| self.not_found(name, describe_request_error(&error)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| self.not_found(name, describe_request_error(&error)))?;

        if !status.is_success() {
            return Err(self.not_found(
                name,
                format!("Server returned {}: {}", status.as_u16(), truncate(&body)),
            ));
        }

        Ok(body)
    }
}

impl AssetProvider for NetHttpProvider {
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
        optional(self.find_stylesheet_strict(name))
    }

    fn find_stylesheet_strict(&self, name: &str) -> MailstyleResult<Stylesheet> {
        let address = match name.strip_prefix("//") {
            Some(rest) => format!("https://{}", rest),
            None => name.to_string(),
        };
        let url = Url::parse(&address)
            .map_err(|error| self.not_found(name, format!("Invalid URL: {}", error)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(self.not_found(name, format!("Unsupported scheme {}", url.scheme())));
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if !self.whitelist.is_empty() && !self.whitelist.contains(&host) {
            return Err(self.not_found(name, format!("{} is not part of the whitelist!", host)));
        }

        let css = self.fetch(name, url.clone())?;
        Stylesheet::new(url.as_str(), &css)
    }
}

impl fmt::Display for NetHttpProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.whitelist.is_empty() {
            f.write_str("NetHttpProvider")
        } else {
            let hosts = self.whitelist().collect::<Vec<_>>().join(", ");
            write!(f, "NetHttpProvider (whitelist: [{}])", hosts)
        }
    }
}

fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Timeout".to_string()
    } else {
        format!("Could not fetch: {}", error)
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    let mut preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    if body.chars().count() > BODY_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
