//! Sitemap generation.
//!
//! Generates `sitemap.xml` from the HTML pages currently in the public tree.

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use pressroom_core::{
    Config, SiteLayout,
    config::SiteConfig,
    layout::{ASSETS_DIR, is_page},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{pages::page_stem, walk};

/// File stem that maps to its directory's URL.
const INDEX_STEM: &str = "index";

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Outcome of a sitemap generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapStats {
    /// Number of `<url>` entries written.
    pub page_count: usize,

    /// Location of the written sitemap.
    pub path: PathBuf,
}

/// A sitemap URL entry.
#[derive(Debug, Clone)]
pub struct SitemapUrl {
    /// URL location.
    pub loc: String,

    /// Last modification date.
    pub lastmod: DateTime<Utc>,
}

/// Sitemap generator over the public tree.
#[derive(Debug, Clone)]
pub struct SitemapGenerator {
    public_dir: PathBuf,
    sitemap_path: PathBuf,
    site: SiteConfig,
}

impl SitemapGenerator {
    /// Create a new sitemap generator.
    #[must_use]
    pub fn new(layout: &SiteLayout, site: SiteConfig) -> Self {
        Self {
            public_dir: layout.public_dir(),
            sitemap_path: layout.sitemap_path(),
            site,
        }
    }

    /// Create a generator configured from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.layout(), config.site.clone())
    }

    /// Location of the sitemap file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.sitemap_path
    }

    /// Published page paths, relative to the public root.
    ///
    /// Files under the public asset root are never pages.
    pub async fn published_pages(&self) -> Result<Vec<String>> {
        let skip = [ASSETS_DIR];
        Ok(walk::list_files(&self.public_dir, &self.public_dir, &skip, is_page).await?)
    }

    /// Write the sitemap for every published page.
    pub async fn generate(&self) -> Result<SitemapStats> {
        let pages = self.published_pages().await?;
        debug!(count = pages.len(), "generating sitemap");

        let mut urls = Vec::with_capacity(pages.len());
        for page in &pages {
            let modified = tokio::fs::metadata(self.public_dir.join(page))
                .await?
                .modified()?;
            urls.push(SitemapUrl {
                loc: self.site.url_for(&url_path(page)),
                lastmod: DateTime::<Utc>::from(modified),
            });
        }

        tokio::fs::create_dir_all(&self.public_dir).await?;
        tokio::fs::write(&self.sitemap_path, render(&urls)).await?;

        info!(
            pages = urls.len(),
            path = %self.sitemap_path.display(),
            "sitemap written"
        );
        Ok(SitemapStats {
            page_count: urls.len(),
            path: self.sitemap_path.clone(),
        })
    }

    /// Remove the sitemap. Returns whether it existed.
    pub async fn delete(&self) -> Result<bool> {
        match tokio::fs::remove_file(&self.sitemap_path).await {
            Ok(()) => {
                info!(path = %self.sitemap_path.display(), "sitemap deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Canonical URL path for a page.
///
/// `about.html` becomes `/about`, `index.html` becomes `/` and
/// `blog/index.html` becomes `/blog/`.
#[must_use]
pub fn url_path(page: &str) -> String {
    let stem = page_stem(page);
    match stem.rsplit_once('/') {
        Some((dir, INDEX_STEM)) => format!("/{dir}/"),
        None if stem == INDEX_STEM => "/".to_string(),
        _ => format!("/{stem}"),
    }
}

fn render(urls: &[SitemapUrl]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for url in urls {
        xml.push_str(&format!(
            "  <url><loc>{}</loc><lastmod>{}</lastmod></url>\n",
            escape_xml(&url.loc),
            url.lastmod.format("%Y-%m-%d")
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
