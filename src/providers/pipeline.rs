//! 从前端构建产物中查找样式表
//!
//! 构建工具通常把 `app.css` 输出为带指纹的 `app-0123abcd.css`，并写一份
//! 逻辑名到产物文件名的 JSON 清单。邮件模板里引用的可能是两者中任意一个。

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::AssetProvider;
use crate::error::{CssNotFound, MailstyleError, MailstyleResult};
use crate::style::Stylesheet;

static FINGERPRINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<stem>.+)-[0-9a-f]{7,128}(?P<extension>\.css)?$")
        .expect("fingerprint pattern is valid")
});

/// 按逻辑名返回资源内容
pub trait AssetPipeline: fmt::Display + Send + Sync {
    /// 找不到时返回 `Ok(None)`
    fn find_asset(&self, logical_path: &str) -> MailstyleResult<Option<String>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    Nested { assets: HashMap<String, String> },
    Flat(HashMap<String, String>),
}

/// 基于 JSON 清单的资源管线
///
/// 清单可以是扁平的 `{"app.css": "app-0123abcd.css"}`，
/// 也可以把映射放在 `assets` 字段下。
#[derive(Debug, Clone)]
pub struct ManifestPipeline {
    root: PathBuf,
    assets: HashMap<String, String>,
}

impl ManifestPipeline {
    /// 读取 `root` 目录下的清单文件
    pub fn load(root: impl Into<PathBuf>, manifest: impl AsRef<Path>) -> MailstyleResult<Self> {
        let root = root.into();
        let text = fs::read_to_string(root.join(manifest.as_ref()))?;
        let assets = match serde_json::from_str(&text) {
            Ok(Manifest::Nested { assets }) | Ok(Manifest::Flat(assets)) => assets,
            Err(error) => {
                return Err(MailstyleError::Config(format!(
                    "Cannot read asset manifest {}: {}",
                    manifest.as_ref().display(),
                    error
                )))
            }
        };

        debug!("Loaded {} assets from manifest", assets.len());
        Ok(ManifestPipeline { root, assets })
    }

    pub fn from_assets(root: impl Into<PathBuf>, assets: HashMap<String, String>) -> Self {
        ManifestPipeline {
            root: root.into(),
            assets,
        }
    }
}

impl AssetPipeline for ManifestPipeline {
    fn find_asset(&self, logical_path: &str) -> MailstyleResult<Option<String>> {
        let Some(file) = self.assets.get(logical_path) else {
            return Ok(None);
        };
        match fs::read_to_string(self.root.join(file)) {
            Ok(css) => Ok(Some(css)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}

impl fmt::Display for ManifestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManifestPipeline: {:?}", self.root)
    }
}

/// 通过资源管线查找样式表
///
/// 查找前会去掉前缀（默认 `/assets/`）、查询串和文件名中的指纹。
pub struct PipelineProvider<P: AssetPipeline> {
    pipeline: P,
    prefix: String,
}

impl<P: AssetPipeline> PipelineProvider<P> {
    pub fn new(pipeline: P) -> Self {
        PipelineProvider {
            pipeline,
            prefix: "/assets/".to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// 把引用名称规范化为资源管线中的逻辑名
    pub fn logical_name(&self, name: &str) -> String {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let name = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
        let name = name.trim_start_matches('/');

        let name = match FINGERPRINT.captures(name) {
            Some(captures) => format!(
                "{}{}",
                &captures["stem"],
                captures.name("extension").map_or("", |extension| extension.as_str())
            ),
            None => name.to_string(),
        };

        if name.ends_with(".css") {
            name
        } else {
            format!("{}.css", name)
        }
    }
}

impl<P: AssetPipeline> AssetProvider for PipelineProvider<P> {
    fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
        let logical_name = self.logical_name(name);
        debug!("Looking up {:?} as {:?} in asset pipeline", name, logical_name);
        match self.pipeline.find_asset(&logical_name)? {
            Some(css) => Stylesheet::new(logical_name, &css).map(Some),
            None => Ok(None),
        }
    }

    fn find_stylesheet_strict(&self, name: &str) -> MailstyleResult<Stylesheet> {
        let logical_name = self.logical_name(name);
        match self.find_stylesheet(name)? {
            Some(stylesheet) => Ok(stylesheet),
            None => Err(CssNotFound::new(
                name,
                format!("{} is not part of the asset pipeline", logical_name),
                self,
            )
            .into()),
        }
    }
}

impl<P: AssetPipeline> fmt::Display for PipelineProvider<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PipelineProvider ({})", self.pipeline)
    }
}
