//! 配置文件支持
//!
//! 配置使用 TOML 格式，所有字段都可以省略：
//!
//! ```toml
//! asset_root = "public"
//! asset_prefix = "/stylesheets"
//! whitelist = ["cdn.example.com"]
//! fetch_external = true
//! cache_capacity = 64
//! mode = "xhtml"
//!
//! [url_options]
//! host = "example.com"
//! scheme = "https"
//! ```
//!
//! 环境变量（见 [`crate::env`]）会覆盖文件中的对应值。

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::core::Document;
use crate::env::{assets, network, EnvVar};
use crate::error::{MailstyleError, MailstyleResult};
use crate::parsers::html::DocumentMode;
use crate::providers::{
    AssetProvider, CachedProvider, FilesystemProvider, LruStore, MemoryStore, NetHttpOptions,
    NetHttpProvider, ProviderList,
};
use crate::utils::url::UrlOptions;

/// 完整的配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailstyleConfig {
    /// 设置后把相对链接改写为绝对URL
    pub url_options: Option<UrlOptions>,
    /// 本地样式表的根目录
    pub asset_root: Option<PathBuf>,
    /// 查找本地样式表前从名称中去掉的前缀
    pub asset_prefix: Option<String>,
    /// 允许下载样式表的主机
    pub whitelist: Vec<String>,
    pub http_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// 缓存的样式表数量；`0` 表示不限数量，不设置表示不缓存
    pub cache_capacity: Option<usize>,
    pub keep_uninlinable_css: bool,
    pub merge_media_queries: bool,
    pub mode: DocumentMode,
    /// 把输入当作片段处理
    pub fragment: bool,
    /// 是否下载绝对URL引用的样式表
    pub fetch_external: Option<bool>,
}

impl Default for MailstyleConfig {
    fn default() -> Self {
        MailstyleConfig {
            url_options: None,
            asset_root: None,
            asset_prefix: None,
            whitelist: Vec::new(),
            http_timeout_secs: None,
            user_agent: None,
            cache_capacity: None,
            keep_uninlinable_css: true,
            merge_media_queries: true,
            mode: DocumentMode::Html,
            fragment: false,
            fetch_external: None,
        }
    }
}

impl MailstyleConfig {
    pub fn from_toml_str(source: &str) -> MailstyleResult<Self> {
        toml::from_str(source).map_err(|error| MailstyleError::Config(error.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> MailstyleResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let source = fs::read_to_string(path)?;
        toml::from_str(&source)
            .map_err(|error| MailstyleError::Config(format!("{}: {}", path.display(), error)))
    }

    /// 用已设置的环境变量覆盖配置
    pub fn with_env_overrides(mut self) -> MailstyleResult<Self> {
        if let Some(root) = assets::Root::get_optional()? {
            self.asset_root = Some(root);
        }
        if let Some(timeout) = network::HttpTimeout::get_optional()? {
            self.http_timeout_secs = Some(timeout.as_secs());
        }
        if let Some(user_agent) = network::UserAgent::get_optional()? {
            self.user_agent = Some(user_agent);
        }
        if let Some(fetch_external) = network::FetchExternal::get_optional()? {
            self.fetch_external = Some(fetch_external);
        }
        Ok(self)
    }

    /// 本地样式表的提供者列表
    pub fn asset_providers(&self) -> ProviderList {
        let root = self
            .asset_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let mut filesystem = FilesystemProvider::new(root);
        if let Some(prefix) = &self.asset_prefix {
            filesystem = filesystem.with_prefix(prefix.clone());
        }

        ProviderList::wrap(self.cached(Arc::new(filesystem)))
    }

    /// 外部样式表的提供者列表
    ///
    /// 没有开启 `fetch_external` 时为空，绝对URL引用的样式表保持原样。
    pub fn external_asset_providers(&self) -> MailstyleResult<ProviderList> {
        if !self.fetch_external.unwrap_or(false) {
            return Ok(ProviderList::new());
        }

        let mut options = NetHttpOptions::default().with_whitelist(self.whitelist.iter().cloned());
        if let Some(seconds) = self.http_timeout_secs {
            options = options.with_timeout(Duration::from_secs(seconds));
        }
        if let Some(user_agent) = &self.user_agent {
            options = options.with_user_agent(user_agent.clone());
        }

        let provider = NetHttpProvider::new(options)?;
        Ok(ProviderList::wrap(self.cached(Arc::new(provider))))
    }

    /// 按配置构造待转换的文档
    pub fn document(&self, html: impl Into<String>) -> MailstyleResult<Document> {
        let document = if self.fragment {
            Document::fragment(html)
        } else {
            Document::new(html)
        };

        let mut document = document
            .with_asset_providers(self.asset_providers())
            .with_external_asset_providers(self.external_asset_providers()?)
            .with_keep_uninlinable_css(self.keep_uninlinable_css)
            .with_merge_media_queries(self.merge_media_queries)
            .with_mode(self.mode);
        if let Some(url_options) = &self.url_options {
            document = document.with_url_options(url_options.clone());
        }

        Ok(document)
    }

    fn cached(&self, provider: Arc<dyn AssetProvider>) -> Arc<dyn AssetProvider> {
        match self.cache_capacity {
            None => provider,
            Some(capacity) => match NonZeroUsize::new(capacity) {
                Some(capacity) => Arc::new(CachedProvider::with_store(
                    provider,
                    LruStore::new(capacity),
                )),
                None => Arc::new(CachedProvider::with_store(provider, MemoryStore::new())),
            },
        }
    }
}
