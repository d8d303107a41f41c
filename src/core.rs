//! 文档处理核心
//!
//! [`Document`] 把各个组件串成一条固定的处理流程：
//!
//! 解析 → 前置回调 → 结构修正（仅完整文档）→ 收集样式表 → 内联 → 重写URL → 后置回调 → 序列化

use std::fmt;

use kuchiki::NodeRef;
use tracing::debug;

use crate::error::MailstyleResult;
use crate::parsers::html::dom::{fragment_root, fragment_to_dom, html_to_dom, strip_blank_text_nodes};
use crate::parsers::html::{
    remove_ignore_markers, serialize_document, serialize_fragment, AssetScanner, DocumentMode,
    MarkupImprover,
};
use crate::parsers::link_rewriter::{NullUrlRewriter, UrlRewrite, UrlRewriter};
use crate::providers::{FilesystemProvider, ProviderList};
use crate::style::{InlineOptions, Inliner, Stylesheet, UninlinableTarget};
use crate::utils::url::{UrlGenerator, UrlOptions};

/// 通过 [`Document::add_css`] 加入的样式表的名称
const ADDED_CSS_NAME: &str = "(added css)";

/// 转换前后调用的回调，参数是可修改的 DOM 和文档本身
pub type TransformCallback = Box<dyn Fn(&NodeRef, &Document)>;

/// 输入是完整文档还是片段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentStructure {
    /// 完整的 HTML 文档，会补齐 doctype、`<head>` 等结构
    #[default]
    Full,
    /// HTML 片段，不补齐结构，只输出片段本身
    Fragment,
}

/// 待转换的 HTML 文档
///
/// 通过 `with_*` 方法配置，调用 [`Document::transform`] 得到内联后的 HTML。
/// 转换会消耗文档；原始 HTML 字符串不会被修改。
pub struct Document {
    html: String,
    css: String,
    asset_providers: ProviderList,
    external_asset_providers: ProviderList,
    url_options: Option<UrlOptions>,
    keep_uninlinable_css: bool,
    merge_media_queries: bool,
    mode: DocumentMode,
    structure: DocumentStructure,
    before_transformation: Option<TransformCallback>,
    after_transformation: Option<TransformCallback>,
}

impl Document {
    /// 完整的 HTML 文档
    pub fn new(html: impl Into<String>) -> Self {
        Document {
            html: html.into(),
            css: String::new(),
            asset_providers: ProviderList::of(FilesystemProvider::default()),
            external_asset_providers: ProviderList::new(),
            url_options: None,
            keep_uninlinable_css: true,
            merge_media_queries: true,
            mode: DocumentMode::Html,
            structure: DocumentStructure::Full,
            before_transformation: None,
            after_transformation: None,
        }
    }

    /// HTML 片段
    pub fn fragment(html: impl Into<String>) -> Self {
        Document {
            structure: DocumentStructure::Fragment,
            ..Document::new(html)
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// 额外加入的CSS，按加入顺序拼接
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn structure(&self) -> DocumentStructure {
        self.structure
    }

    pub fn mode(&self) -> DocumentMode {
        self.mode
    }

    pub fn url_options(&self) -> Option<&UrlOptions> {
        self.url_options.as_ref()
    }

    pub fn asset_providers(&self) -> &ProviderList {
        &self.asset_providers
    }

    pub fn asset_providers_mut(&mut self) -> &mut ProviderList {
        &mut self.asset_providers
    }

    pub fn external_asset_providers(&self) -> &ProviderList {
        &self.external_asset_providers
    }

    pub fn external_asset_providers_mut(&mut self) -> &mut ProviderList {
        &mut self.external_asset_providers
    }

    /// 追加CSS
    ///
    /// 加入的CSS排在文档中找到的所有样式表之后，特异性相同时优先生效。
    pub fn add_css(&mut self, css: &str) {
        if !self.css.is_empty() {
            self.css.push('\n');
        }
        self.css.push_str(css);
    }

    pub fn with_css(mut self, css: &str) -> Self {
        self.add_css(css);
        self
    }

    pub fn with_asset_providers(mut self, providers: ProviderList) -> Self {
        self.asset_providers = providers;
        self
    }

    pub fn with_external_asset_providers(mut self, providers: ProviderList) -> Self {
        self.external_asset_providers = providers;
        self
    }

    pub fn with_url_options(mut self, url_options: UrlOptions) -> Self {
        self.url_options = Some(url_options);
        self
    }

    pub fn with_keep_uninlinable_css(mut self, keep: bool) -> Self {
        self.keep_uninlinable_css = keep;
        self
    }

    pub fn with_merge_media_queries(mut self, merge: bool) -> Self {
        self.merge_media_queries = merge;
        self
    }

    pub fn with_mode(mut self, mode: DocumentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_before_transformation<F>(mut self, callback: F) -> Self
    where
        F: Fn(&NodeRef, &Document) + 'static,
    {
        self.before_transformation = Some(Box::new(callback));
        self
    }

    pub fn with_after_transformation<F>(mut self, callback: F) -> Self
    where
        F: Fn(&NodeRef, &Document) + 'static,
    {
        self.after_transformation = Some(Box::new(callback));
        self
    }

    /// 执行转换并返回最终的 HTML
    pub fn transform(self) -> MailstyleResult<String> {
        // 1. 解析HTML
        let dom = match self.structure {
            DocumentStructure::Full => html_to_dom(&self.html),
            DocumentStructure::Fragment => fragment_to_dom(&self.html),
        };

        // 2. 前置回调
        if let Some(callback) = &self.before_transformation {
            callback(&dom, &self);
        }

        // 3. 修正文档结构
        match self.structure {
            DocumentStructure::Full => MarkupImprover::new(&dom, &self.html).improve(),
            DocumentStructure::Fragment => strip_blank_text_nodes(&fragment_root(&dom)),
        }

        // 4. 收集样式表，额外加入的CSS排在最后
        let mut stylesheets = AssetScanner::new(
            &dom,
            &self.asset_providers,
            &self.external_asset_providers,
        )
        .extract_css()?;
        if !self.css.trim().is_empty() {
            stylesheets.push(Stylesheet::new(ADDED_CSS_NAME, &self.css)?);
        }

        // 5. 内联
        let warnings = Inliner::new(&stylesheets, &dom).inline(&self.inline_options());
        if !warnings.is_empty() {
            debug!("Skipped {} selectors while inlining", warnings.len());
        }

        // 6. 重写URL
        self.url_rewriter()?.transform_dom(&dom)?;

        // 7. 后置回调
        if let Some(callback) = &self.after_transformation {
            callback(&dom, &self);
        }
        remove_ignore_markers(&dom);

        // 8. 序列化
        match self.structure {
            DocumentStructure::Full => serialize_document(&dom, self.mode),
            DocumentStructure::Fragment => serialize_fragment(&dom, self.mode),
        }
    }

    fn inline_options(&self) -> InlineOptions {
        InlineOptions {
            keep_uninlinable_css: self.keep_uninlinable_css,
            merge_media_queries: self.merge_media_queries,
            target: match self.structure {
                DocumentStructure::Full => UninlinableTarget::Head,
                DocumentStructure::Fragment => UninlinableTarget::FragmentRoot,
            },
        }
    }

    fn url_rewriter(&self) -> MailstyleResult<Box<dyn UrlRewrite>> {
        match &self.url_options {
            Some(url_options) => Ok(Box::new(UrlRewriter::new(UrlGenerator::new(
                url_options.clone(),
            )?))),
            None => Ok(Box::new(NullUrlRewriter)),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("structure", &self.structure)
            .field("mode", &self.mode)
            .field("css", &self.css)
            .field("asset_providers", &self.asset_providers)
            .field("external_asset_providers", &self.external_asset_providers)
            .field("url_options", &self.url_options)
            .field("keep_uninlinable_css", &self.keep_uninlinable_css)
            .field("merge_media_queries", &self.merge_media_queries)
            .finish_non_exhaustive()
    }
}
