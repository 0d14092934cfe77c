//! Publish orchestration.
//!
//! Promotes draft pages into the public tree and then runs the post-publish
//! hooks (asset fingerprinting, sitemap regeneration). Page copies fail
//! individually; hook failures are captured in the report and never fail
//! the page-level operation.

use std::{fmt, io, path::PathBuf, sync::Arc};

use pressroom_core::{Config, CoreError, SiteLayout, layout::is_page_path};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    assets::{AssetError, AssetPublisher},
    manifest::AssetManifest,
    pages::PageStore,
    sitemap::{SitemapError, SitemapGenerator},
    status::{PublishStatus, page_status},
};

/// Publish errors.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Path or lookup error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Asset publishing error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Sitemap generation error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),
}

impl PublishError {
    /// HTTP status code equivalent for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Core(e) => e.status_code(),
            _ => 500,
        }
    }
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Side effect run after every publish or unpublish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostPublishHook {
    /// Fingerprint and copy assets, rewrite the manifest.
    Assets,
    /// Regenerate the sitemap, or delete it when nothing is published.
    Sitemap,
}

impl PostPublishHook {
    /// Default hook order.
    pub const ALL: [Self; 2] = [Self::Assets, Self::Sitemap];
}

impl fmt::Display for PostPublishHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assets => f.write_str("assets"),
            Self::Sitemap => f.write_str("sitemap"),
        }
    }
}

/// Outcome of one post-publish hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookReport {
    pub hook: PostPublishHook,
    /// Error message when the hook failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HookReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A page that could not be copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub path: String,
    pub error: String,
}

/// Structured result of a publish or unpublish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Pages copied into the public tree.
    pub published: Vec<String>,

    /// Pages removed from the public tree.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unpublished: Vec<String>,

    /// Pages that failed to copy.
    pub errors: Vec<PageFailure>,

    /// Post-publish hook outcomes, in execution order.
    pub hooks: Vec<HookReport>,
}

impl PublishReport {
    /// Every page and every hook succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.hooks.iter().all(HookReport::is_ok)
    }

    /// Hooks that failed.
    pub fn hook_failures(&self) -> impl Iterator<Item = &HookReport> {
        self.hooks.iter().filter(|h| !h.is_ok())
    }
}

/// Promotes drafts into the public tree.
///
/// Clones share the publish lock, so at most one publish or unpublish runs
/// at a time across all handles.
#[derive(Debug, Clone)]
pub struct Publisher {
    layout: SiteLayout,
    drafts: PageStore,
    assets: AssetPublisher,
    sitemap: SitemapGenerator,
    manifest: AssetManifest,
    hooks: Vec<PostPublishHook>,
    lock: Arc<Mutex<()>>,
}

impl Publisher {
    /// Create a publisher from configuration and a shared manifest handle.
    #[must_use]
    pub fn new(config: &Config, manifest: AssetManifest) -> Self {
        let layout = config.layout();
        Self {
            drafts: PageStore::new(layout.drafts_dir()),
            assets: AssetPublisher::from_config(config, manifest.clone()),
            sitemap: SitemapGenerator::from_config(config),
            layout,
            manifest,
            hooks: PostPublishHook::ALL.to_vec(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Replace the post-publish hook list.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Vec<PostPublishHook>) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Draft page store.
    #[must_use]
    pub fn drafts(&self) -> &PageStore {
        &self.drafts
    }

    /// Manifest handle kept in sync with every asset publish.
    #[must_use]
    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    #[must_use]
    pub fn sitemap(&self) -> &SitemapGenerator {
        &self.sitemap
    }

    /// Publish every draft page.
    ///
    /// Individual copy failures are recorded in the report; only a failure
    /// to list the draft tree is an error.
    pub async fn publish_all(&self) -> Result<PublishReport> {
        let pages = self.drafts.list("").await?;
        self.publish_pages(pages).await
    }

    /// Publish the given draft pages, recording per-page failures.
    pub async fn publish_pages(&self, pages: Vec<String>) -> Result<PublishReport> {
        let _guard = self.lock.lock().await;
        info!(count = pages.len(), "publishing pages");

        let mut report = PublishReport::default();
        for page in pages {
            match self.copy_page(&page).await {
                Ok(()) => report.published.push(page),
                Err(e) => {
                    warn!(page = %page, error = %e, "failed to publish page");
                    report.errors.push(PageFailure {
                        path: page,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.hooks = self.run_hooks().await;
        info!(
            published = report.published.len(),
            failed = report.errors.len(),
            "publish finished"
        );
        Ok(report)
    }

    /// Publish a single page.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotAPage`] when `page` is not an HTML page outside the
    /// asset root, [`CoreError::NotFound`] when no draft exists for it.
    pub async fn publish_one(&self, page: &str) -> Result<PublishReport> {
        let _guard = self.lock.lock().await;

        self.page_paths(page)?;
        if !self.drafts.exists(page).await? {
            return Err(CoreError::not_found(page).into());
        }
        self.copy_page(page).await?;
        info!(page, "published page");

        Ok(PublishReport {
            published: vec![page.to_string()],
            hooks: self.run_hooks().await,
            ..PublishReport::default()
        })
    }

    /// Remove a page from the public tree.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotAPage`] when `page` is not an HTML page outside the
    /// asset root, [`CoreError::NotFound`] when no public copy exists for it.
    pub async fn unpublish(&self, page: &str) -> Result<PublishReport> {
        let _guard = self.lock.lock().await;

        let (_, public) = self.page_paths(page)?;
        match tokio::fs::remove_file(&public).await {
            Ok(()) => info!(page, "unpublished page"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::not_found(page).into());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(PublishReport {
            unpublished: vec![page.to_string()],
            hooks: self.run_hooks().await,
            ..PublishReport::default()
        })
    }

    /// Publish status of a page.
    pub async fn status(&self, page: &str) -> Result<PublishStatus> {
        Ok(page_status(&self.layout, page).await?)
    }

    /// Draft and public locations of a page.
    ///
    /// Only pages ever reach the public tree through here; assets go
    /// through the asset hook.
    fn page_paths(&self, page: &str) -> Result<(PathBuf, PathBuf)> {
        let draft = self.layout.draft_page(page)?;
        let public = self.layout.public_page(page)?;
        if !is_page_path(page) {
            return Err(CoreError::not_a_page(page).into());
        }
        Ok((draft, public))
    }

    /// Copy one draft page over its public counterpart.
    async fn copy_page(&self, page: &str) -> Result<()> {
        let (source, dest) = self.page_paths(page)?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&source, &dest).await?;

        debug!(page, dest = %dest.display(), "copied page");
        Ok(())
    }

    /// Run every configured hook, capturing each failure independently.
    pub async fn run_hooks(&self) -> Vec<HookReport> {
        let mut reports = Vec::with_capacity(self.hooks.len());
        for &hook in &self.hooks {
            let error = match self.run_hook(hook).await {
                Ok(()) => None,
                Err(e) => {
                    warn!(%hook, error = %e, "post-publish hook failed");
                    Some(e.to_string())
                }
            };
            reports.push(HookReport { hook, error });
        }
        reports
    }

    async fn run_hook(&self, hook: PostPublishHook) -> Result<()> {
        match hook {
            PostPublishHook::Assets => {
                self.assets.publish().await?;
            }
            PostPublishHook::Sitemap => {
                if self.sitemap.published_pages().await?.is_empty() {
                    self.sitemap.delete().await?;
                } else {
                    self.sitemap.generate().await?;
                }
            }
        }
        Ok(())
    }
}
