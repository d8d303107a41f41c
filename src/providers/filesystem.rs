use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::UTF_8;
use tracing::debug;

use super::{optional, AssetProvider};
use crate::error::{CssNotFound, MailstyleResult};
use crate::style::Stylesheet;

/// 从本地目录读取样式表
///
/// 名称中的查询串会被忽略，可选的前缀（例如 `/assets`）会被去掉。
/// 找不到时还会尝试补上 `.css` 扩展名。解析后位于根目录之外的路径一律视为不存在。
#[derive(Debug, Clone)]
pub struct FilesystemProvider {
    root: PathBuf,
    prefix: Option<String>,
}

impl FilesystemProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemProvider {
            root: root.into(),
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, String> {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let name = match &self.prefix {
            Some(prefix) => name.strip_prefix(prefix.as_str()).unwrap_or(name),
            None => name,
        };
        let relative = squeeze_separators(name);
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            return Err("No file name given".to_string());
        }

        let root = fs::canonicalize(&self.root)
            .map_err(|error| format!("Cannot read {}: {}", self.root.display(), error))?;

        for candidate in [relative.to_string(), format!("{}.css", relative)] {
            let Ok(path) = fs::canonicalize(root.join(&candidate)) else {
                continue;
            };
            if !path.starts_with(&root) {
                return Err(format!("{} is outside of {}", candidate, root.display()));
            }
            if path.is_file() {
                return Ok(path);
            }
        }

        Err(format!("{} does not exist", root.join(relative).display()))
    }
}

impl Default for FilesystemProvider {
    fn default() -> Self {
        FilesystemProvider::new(".")
    }
}

impl AssetProvider for FilesystemProvider {
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
        optional(self.find_stylesheet_strict(name))
    }

    fn find_stylesheet_strict(&self, name: &str) -> MailstyleResult<Stylesheet> {
        let path = self
            .resolve(name)
            .map_err(|reason| CssNotFound::new(name, reason, self))?;
        debug!("Reading stylesheet {:?} from {}", name, path.display());

        let bytes = fs::read(&path)
            .map_err(|error| CssNotFound::new(name, error.to_string(), self))?;
        let (css, _, _) = UTF_8.decode(&bytes);

        Stylesheet::new(path.display().to_string(), &css)
    }
}

impl fmt::Display for FilesystemProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilesystemProvider: {:?}", self.root)?;
        if let Some(prefix) = &self.prefix {
            write!(f, " (prefix {:?})", prefix)?;
        }
        Ok(())
    }
}

fn squeeze_separators(name: &str) -> String {
    let mut squeezed = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '/' && squeezed.ends_with('/') {
            continue;
        }
        squeezed.push(c);
    }
    squeezed
}
