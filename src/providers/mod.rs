//! # 样式表提供者
//!
//! 提供者负责按名称查找样式表。每个提供者都实现 [`AssetProvider`]：
//!
//! - `find_stylesheet` 找不到时返回 `Ok(None)`
//! - `find_stylesheet_strict` 找不到时返回 [`CssNotFound`]，并说明原因
//!
//! 两种查找遇到格式错误的CSS都会返回错误，不会被当成“找不到”。
//!
//! # 模块组织
//!
//! - `filesystem` - 从本地目录读取
//! - `net_http` - 通过 HTTP(S) 下载
//! - `cached` - 为任意提供者加一层缓存
//! - `path_rewriter` - 查找前改写名称
//! - `pipeline` - 从构建产物清单中查找

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CssNotFound, MailstyleError, MailstyleResult};
use crate::style::Stylesheet;

pub mod cached;
pub mod filesystem;
pub mod net_http;
pub mod path_rewriter;
pub mod pipeline;

pub use cached::{CacheStore, CachedProvider, LruStore, MemoryStore};
pub use filesystem::FilesystemProvider;
pub use net_http::{NetHttpOptions, NetHttpProvider};
pub use path_rewriter::PathRewriterProvider;
pub use pipeline::{AssetPipeline, ManifestPipeline, PipelineProvider};

/// 按名称查找样式表的能力
pub trait AssetProvider: fmt::Display + Send + Sync {
    /// 查找样式表，找不到时返回 `Ok(None)`
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>>;

    /// 查找样式表，找不到时返回 [`MailstyleError::CssNotFound`]
    fn find_stylesheet_strict(&self, name: &str) -> MailstyleResult<Stylesheet> {
        match self.find_stylesheet(name)? {
            Some(stylesheet) => Ok(stylesheet),
            None => Err(CssNotFound::new(name, "", self).into()),
        }
    }

    /// 列表型提供者返回自己的成员，用于展开嵌套而不重复包装
    fn members(&self) -> Option<Vec<Arc<dyn AssetProvider>>> {
        None
    }
}

/// 把严格查找的结果转换为非严格查找的结果
pub(crate) fn optional(result: MailstyleResult<Stylesheet>) -> MailstyleResult<Option<Stylesheet>> {
    match result {
        Ok(stylesheet) => Ok(Some(stylesheet)),
        Err(MailstyleError::CssNotFound(error)) => {
            debug!("{}", error);
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// 在缩进的多行描述中使用
pub(crate) fn indent(description: &str) -> String {
    description.replace('\n', "\n\t")
}

/// 总是返回空样式表的提供者
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProvider;

impl AssetProvider for NullProvider {
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
        Ok(Some(Stylesheet::empty(name)))
    }
}

impl fmt::Display for NullProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(null)")
    }
}

/// 有序的提供者列表
///
/// 按顺序询问每个成员，第一个找到的结果胜出。严格查找全部失败时，
/// 返回的错误会列出每个成员的失败原因。
#[derive(Clone, Default)]
pub struct ProviderList {
    providers: Vec<Arc<dyn AssetProvider>>,
}

impl ProviderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 包装单个提供者；传入的本身就是列表时直接复用它的成员
    pub fn wrap(provider: Arc<dyn AssetProvider>) -> Self {
        match provider.members() {
            Some(providers) => ProviderList { providers },
            None => ProviderList {
                providers: vec![provider],
            },
        }
    }

    pub fn of(provider: impl AssetProvider + 'static) -> Self {
        Self::wrap(Arc::new(provider))
    }

    pub fn push(&mut self, provider: impl AssetProvider + 'static) {
        self.providers.push(Arc::new(provider));
    }

    pub fn push_shared(&mut self, provider: Arc<dyn AssetProvider>) {
        self.providers.push(provider);
    }

    pub fn prepend(&mut self, provider: impl AssetProvider + 'static) {
        self.providers.insert(0, Arc::new(provider));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AssetProvider>> {
        self.providers.iter()
    }
}

impl AssetProvider for ProviderList {
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
        for provider in &self.providers {
            if let Some(stylesheet) = provider.find_stylesheet(name)? {
                return Ok(Some(stylesheet));
            }
        }
        Ok(None)
    }

    fn find_stylesheet_strict(&self, name: &str) -> MailstyleResult<Stylesheet> {
        let mut failures = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.find_stylesheet_strict(name) {
                Ok(stylesheet) => return Ok(stylesheet),
                Err(MailstyleError::CssNotFound(failure)) => failures.push(failure),
                Err(error) => return Err(error),
            }
        }
        Err(CssNotFound::aggregate(name, self, failures).into())
    }

    fn members(&self) -> Option<Vec<Arc<dyn AssetProvider>>> {
        Some(self.providers.clone())
    }
}

impl From<Vec<Arc<dyn AssetProvider>>> for ProviderList {
    fn from(providers: Vec<Arc<dyn AssetProvider>>) -> Self {
        providers.into_iter().collect()
    }
}

impl<const N: usize> From<[Arc<dyn AssetProvider>; N]> for ProviderList {
    fn from(providers: [Arc<dyn AssetProvider>; N]) -> Self {
        providers.into_iter().collect()
    }
}

/// 成员本身是列表时展开它的成员，不会出现列表套列表
impl FromIterator<Arc<dyn AssetProvider>> for ProviderList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn AssetProvider>>>(iter: I) -> Self {
        let mut providers = Vec::new();
        for provider in iter {
            match provider.members() {
                Some(members) => providers.extend(members),
                None => providers.push(provider),
            }
        }
        ProviderList { providers }
    }
}

impl fmt::Display for ProviderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.providers.is_empty() {
            return f.write_str("ProviderList: []");
        }
        let members = self
            .providers
            .iter()
            .map(|provider| indent(&provider.to_string()))
            .collect::<Vec<_>>()
            .join(",\n\t");
        write!(f, "ProviderList: [\n\t{}\n]", members)
    }
}

impl fmt::Debug for ProviderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
