//! In-memory asset manifest.
//!
//! Holds the latest `original -> fingerprinted` mapping written by the asset
//! publisher and rewrites served HTML to reference fingerprinted URLs.
//!
//! Rewriting is plain substring replacement of `assets/<original>`. It can
//! match inside an unrelated longer path, and for an asset without an
//! extension a second pass appends the digest again because the original
//! name is still a prefix of the fingerprinted one.

use std::{
    borrow::Cow,
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, info, warn};

/// URL prefix under which assets are referenced from HTML.
const ASSET_URL_PREFIX: &str = "assets/";

/// Mapping from original asset path to fingerprinted asset path.
pub type ManifestEntries = BTreeMap<String, String>;

/// Shared handle to the current asset manifest.
///
/// Clones share state, so the handle given to the HTML server observes every
/// reload performed by the publisher.
#[derive(Debug, Clone)]
pub struct AssetManifest {
    path: PathBuf,
    entries: Arc<RwLock<Arc<ManifestEntries>>>,
}

impl AssetManifest {
    /// Create an empty manifest backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Arc::new(RwLock::new(Arc::new(ManifestEntries::new()))),
        }
    }

    /// Create a manifest backed by `path` and load it from disk.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let manifest = Self::new(path);
        manifest.reload().await;
        manifest
    }

    /// Manifest file this handle reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory entries with the file's current contents.
    ///
    /// A missing file yields an empty manifest. An unreadable or malformed
    /// file also yields an empty manifest and is logged as a warning: serving
    /// unfingerprinted paths is always safe. Returns the entry count.
    pub async fn reload(&self) -> usize {
        let entries = match read_entries(&self.path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no asset manifest, using empty");
                ManifestEntries::new()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to load asset manifest, using empty"
                );
                ManifestEntries::new()
            }
        };

        let count = entries.len();
        self.replace(entries);
        info!(count, "asset manifest loaded");
        count
    }

    fn replace(&self, entries: ManifestEntries) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(entries);
    }

    /// Current entries.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ManifestEntries> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Fingerprinted path for an original asset path.
    #[must_use]
    pub fn get(&self, original: &str) -> Option<String> {
        self.snapshot().get(original).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Rewrite `assets/<original>` references to their fingerprinted form.
    ///
    /// Borrows the input untouched when the manifest is empty.
    #[must_use]
    pub fn rewrite<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let entries = self.snapshot();
        if entries.is_empty() {
            return Cow::Borrowed(html);
        }

        let mut out = Cow::Borrowed(html);
        for (original, fingerprinted) in entries.iter() {
            let needle = format!("{ASSET_URL_PREFIX}{original}");
            if out.contains(&needle) {
                let replacement = format!("{ASSET_URL_PREFIX}{fingerprinted}");
                out = Cow::Owned(out.replace(&needle, &replacement));
            }
        }
        out
    }
}

async fn read_entries(path: &Path) -> io::Result<ManifestEntries> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    async fn manifest_with(json: &str) -> (TempDir, AssetManifest) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, json).unwrap();
        let manifest = AssetManifest::load(&path).await;
        (dir, manifest)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let manifest = AssetManifest::load(dir.path().join("manifest.json")).await;
        assert!(manifest.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty() {
        let (_dir, manifest) = manifest_with("{ not json").await;
        assert!(manifest.is_empty());

        let (_dir, manifest) = manifest_with(r#"{"css/a.css": 3}"#).await;
        assert!(manifest.is_empty());
    }

    #[tokio::test]
    async fn test_load_entries() {
        let (_dir, manifest) =
            manifest_with(r#"{"css/main.css": "css/main.abc.css", "js/app.js": "js/app.def.js"}"#)
                .await;

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("css/main.css").as_deref(), Some("css/main.abc.css"));
        assert!(manifest.get("css/other.css").is_none());
    }

    #[tokio::test]
    async fn test_rewrite_empty_manifest_borrows() {
        let dir = TempDir::new().unwrap();
        let manifest = AssetManifest::new(dir.path().join("manifest.json"));
        let html = r#"<link href="/assets/css/main.css">"#;

        assert!(matches!(manifest.rewrite(html), Cow::Borrowed(_)));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_every_occurrence() {
        let (_dir, manifest) =
            manifest_with(r#"{"css/main.css": "css/main.abc.css", "js/app.js": "js/app.def.js"}"#)
                .await;
        let html = concat!(
            r#"<link href="/assets/css/main.css">"#,
            r#"<link href="assets/css/main.css">"#,
            r#"<script src="/assets/js/app.js"></script>"#,
        );

        let out = manifest.rewrite(html);

        assert_eq!(
            out,
            concat!(
                r#"<link href="/assets/css/main.abc.css">"#,
                r#"<link href="assets/css/main.abc.css">"#,
                r#"<script src="/assets/js/app.def.js"></script>"#,
            )
        );
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent() {
        let (_dir, manifest) = manifest_with(r#"{"css/main.css": "css/main.abc.css"}"#).await;
        let html = r#"<link href="/assets/css/main.css">"#;

        let once = manifest.rewrite(html).into_owned();
        let twice = manifest.rewrite(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_rewrite_extensionless_asset_is_not_idempotent() {
        let (_dir, manifest) = manifest_with(r#"{"LICENSE": "LICENSE.abc"}"#).await;
        let html = r#"<a href="/assets/LICENSE">"#;

        let once = manifest.rewrite(html).into_owned();
        let twice = manifest.rewrite(&once).into_owned();

        assert_eq!(once, r#"<a href="/assets/LICENSE.abc">"#);
        assert_eq!(twice, r#"<a href="/assets/LICENSE.abc.abc">"#);
    }

    #[tokio::test]
    async fn test_reload_replaces_wholesale() {
        let (dir, manifest) = manifest_with(r#"{"a.css": "a.1.css", "b.css": "b.1.css"}"#).await;
        let shared = manifest.clone();

        fs::write(dir.path().join("manifest.json"), r#"{"a.css": "a.2.css"}"#).unwrap();
        assert_eq!(manifest.reload().await, 1);

        assert_eq!(shared.get("a.css").as_deref(), Some("a.2.css"));
        assert!(shared.get("b.css").is_none());
    }
}
