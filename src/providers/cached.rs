use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use tracing::debug;

use super::{indent, AssetProvider};
use crate::error::{CssNotFound, MailstyleError, MailstyleResult};
use crate::style::Stylesheet;

const CACHED_MISS_REASON: &str = "Stylesheet was previously reported missing by the upstream provider";

/// 缓存存储
///
/// 值为 `None` 表示上游已确认该名称不存在（负缓存）。
pub trait CacheStore: Send + Sync {
    /// `None` 表示未缓存，`Some(None)` 表示已缓存的“不存在”
    fn get(&self, name: &str) -> Option<Option<Stylesheet>>;
    fn insert(&self, name: &str, stylesheet: Option<Stylesheet>);
    fn clear(&self);
}

/// 不限容量的内存缓存
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Option<Stylesheet>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, name: &str) -> Option<Option<Stylesheet>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn insert(&self, name: &str, stylesheet: Option<Stylesheet>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), stylesheet);
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// 有容量上限的 LRU 缓存
#[derive(Debug)]
pub struct LruStore {
    entries: Mutex<LruCache<String, Option<Stylesheet>>>,
}

impl LruStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        LruStore {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for LruStore {
    fn get(&self, name: &str) -> Option<Option<Stylesheet>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn insert(&self, name: &str, stylesheet: Option<Stylesheet>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(name.to_string(), stylesheet);
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// 为上游提供者加一层缓存
///
/// 找到的样式表和“找不到”的结果都会被缓存，同一名称只询问上游一次。
/// 格式错误等其他错误不会被缓存。
pub struct CachedProvider<S: CacheStore = MemoryStore> {
    upstream: Arc<dyn AssetProvider>,
    store: S,
}

impl CachedProvider<MemoryStore> {
    pub fn new(upstream: impl AssetProvider + 'static) -> Self {
        CachedProvider::with_store(Arc::new(upstream), MemoryStore::new())
    }
}

impl<S: CacheStore> CachedProvider<S> {
    pub fn with_store(upstream: Arc<dyn AssetProvider>, store: S) -> Self {
        CachedProvider { upstream, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: CacheStore> AssetProvider for CachedProvider<S> {
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
        if let Some(cached) = self.store.get(name) {
            debug!("Cache hit for stylesheet {:?}", name);
            return Ok(cached);
        }

        debug!("Cache miss for stylesheet {:?}", name);
        let found = self.upstream.find_stylesheet(name)?;
        self.store.insert(name, found.clone());
        Ok(found)
    }

    fn find_stylesheet_strict(&self, name: &str) -> MailstyleResult<Stylesheet> {
        match self.store.get(name) {
            Some(Some(stylesheet)) => {
                debug!("Cache hit for stylesheet {:?}", name);
                Ok(stylesheet)
            }
            Some(None) => Err(CssNotFound::new(name, CACHED_MISS_REASON, self).into()),
            None => {
                debug!("Cache miss for stylesheet {:?}", name);
                match self.upstream.find_stylesheet_strict(name) {
                    Ok(stylesheet) => {
                        self.store.insert(name, Some(stylesheet.clone()));
                        Ok(stylesheet)
                    }
                    Err(MailstyleError::CssNotFound(error)) => {
                        self.store.insert(name, None);
                        Err(error.into())
                    }
                    Err(error) => Err(error),
                }
            }
        }
    }
}

impl<S: CacheStore> fmt::Display for CachedProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CachedProvider:\n\t{}", indent(&self.upstream.to_string()))
    }
}
