use std::fmt;
use std::sync::Arc;

use super::{indent, AssetProvider};
use crate::error::{CssNotFound, MailstyleResult};
use crate::style::Stylesheet;

type PathFilter = dyn Fn(&str) -> Option<String> + Send + Sync;

/// 查找前先改写名称的提供者
///
/// 过滤函数返回 `None` 时不询问上游，直接视为找不到。
pub struct PathRewriterProvider {
    upstream: Arc<dyn AssetProvider>,
    filter: Box<PathFilter>,
}

impl PathRewriterProvider {
    pub fn new<F>(upstream: impl AssetProvider + 'static, filter: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        PathRewriterProvider {
            upstream: Arc::new(upstream),
            filter: Box::new(filter),
        }
    }
}

impl AssetProvider for PathRewriterProvider {
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
        match (self.filter)(name) {
            Some(path) => self.upstream.find_stylesheet(&path),
            None => Ok(None),
        }
    }

    fn find_stylesheet_strict(&self, name: &str) -> MailstyleResult<Stylesheet> {
        match (self.filter)(name) {
            Some(path) => self.upstream.find_stylesheet_strict(&path),
            None => Err(CssNotFound::new(name, "Filter returned no path", self).into()),
        }
    }
}

impl fmt::Display for PathRewriterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathRewriterProvider:\n\t{}", indent(&self.upstream.to_string()))
    }
}
