//! On-disk layout of the draft and public trees.

use std::path::{Path, PathBuf};

use crate::{error::Result, path_guard};

/// Directory holding editable draft pages and assets.
pub const DRAFTS_DIR: &str = "drafts";

/// Directory holding the live, served copy of the site.
pub const PUBLIC_DIR: &str = "public";

/// Asset root inside both trees.
pub const ASSETS_DIR: &str = "assets";

/// Manifest file name under the public asset root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Sitemap file name under the public root.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Extension every page carries.
pub const PAGE_EXTENSION: &str = "html";

/// Resolved locations of every tree and artifact under a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    base_dir: PathBuf,
}

impl SiteLayout {
    /// Create a layout rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn drafts_dir(&self) -> PathBuf {
        self.base_dir.join(DRAFTS_DIR)
    }

    #[must_use]
    pub fn public_dir(&self) -> PathBuf {
        self.base_dir.join(PUBLIC_DIR)
    }

    #[must_use]
    pub fn draft_assets_dir(&self) -> PathBuf {
        self.drafts_dir().join(ASSETS_DIR)
    }

    #[must_use]
    pub fn public_assets_dir(&self) -> PathBuf {
        self.public_dir().join(ASSETS_DIR)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.public_assets_dir().join(MANIFEST_FILE)
    }

    #[must_use]
    pub fn sitemap_path(&self) -> PathBuf {
        self.public_dir().join(SITEMAP_FILE)
    }

    /// Resolve an untrusted page path inside the draft tree.
    pub fn draft_page(&self, page: &str) -> Result<PathBuf> {
        path_guard::resolve(&self.drafts_dir(), page)
    }

    /// Resolve an untrusted page path inside the public tree.
    pub fn public_page(&self, page: &str) -> Result<PathBuf> {
        path_guard::resolve(&self.public_dir(), page)
    }
}

/// Whether a file name carries the page extension.
#[must_use]
pub fn is_page(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == PAGE_EXTENSION)
}

/// Whether a tree-relative path names a page rather than an asset.
///
/// Anything under the top-level asset root is an asset, whatever its
/// extension.
#[must_use]
pub fn is_page_path(path: &str) -> bool {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    is_page(path) && parts.first() != Some(&ASSETS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = SiteLayout::new("/srv/site");
        assert_eq!(layout.drafts_dir(), PathBuf::from("/srv/site/drafts"));
        assert_eq!(
            layout.draft_assets_dir(),
            PathBuf::from("/srv/site/drafts/assets")
        );
        assert_eq!(
            layout.manifest_path(),
            PathBuf::from("/srv/site/public/assets/manifest.json")
        );
        assert_eq!(
            layout.sitemap_path(),
            PathBuf::from("/srv/site/public/sitemap.xml")
        );
    }

    #[test]
    fn test_page_paths_are_guarded() {
        let layout = SiteLayout::new("/srv/site");
        assert_eq!(
            layout.public_page("blog/post.html").unwrap(),
            PathBuf::from("/srv/site/public/blog/post.html")
        );
        assert!(layout.draft_page("../public/index.html").is_err());
    }

    #[test]
    fn test_is_page() {
        assert!(is_page("index.html"));
        assert!(is_page("blog/post.html"));
        assert!(!is_page("index.html.20260101T000000000Z.bak"));
        assert!(!is_page("style.css"));
        assert!(!is_page("html"));
    }

    #[test]
    fn test_is_page_path() {
        assert!(is_page_path("index.html"));
        assert!(is_page_path("blog/assets/inline.html"));
        assert!(!is_page_path("assets/templates/snippet.html"));
        assert!(!is_page_path("./assets/snippet.html"));
        assert!(!is_page_path("blog/../assets/snippet.html"));
        assert!(!is_page_path("notes.txt"));
    }
}
