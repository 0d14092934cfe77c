//! Draft page storage.
//!
//! CRUD over HTML documents in the draft tree. Nothing here ever touches the
//! public tree; promotion is the publisher's job.

use std::{
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::Utc;
use pressroom_core::{
    Result,
    layout::{ASSETS_DIR, PAGE_EXTENSION, is_page},
    path_guard,
};
use tracing::{debug, info};

use crate::walk;

/// Sortable UTC timestamp embedded in backup file names.
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

/// Page store rooted at the draft tree.
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Create a store over the given draft root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The draft root this store operates on.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an untrusted page path inside the draft root.
    pub fn resolve(&self, page: &str) -> Result<PathBuf> {
        path_guard::resolve(&self.root, page)
    }

    /// Read a page, returning `None` when it does not exist.
    pub async fn get(&self, page: &str) -> Result<Option<String>> {
        let path = self.resolve(page)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a page, creating missing parent directories.
    pub async fn save(&self, page: &str, html: &str) -> Result<PathBuf> {
        let path = self.resolve(page)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, html).await?;

        debug!(page, bytes = html.len(), "saved draft page");
        Ok(path)
    }

    /// Delete a page. Returns `false` if it was already absent.
    pub async fn delete(&self, page: &str) -> Result<bool> {
        let path = self.resolve(page)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(page, "deleted draft page");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a draft exists for the page.
    pub async fn exists(&self, page: &str) -> Result<bool> {
        Ok(self.mtime(page).await?.is_some())
    }

    /// Last modification time of a page, `None` when absent.
    pub async fn mtime(&self, page: &str) -> Result<Option<SystemTime>> {
        let path = self.resolve(page)?;
        modified(&path).await
    }

    /// List page paths recursively, relative to the draft root.
    ///
    /// An empty `subdir` lists the whole tree. The asset root is never
    /// entered, so HTML fragments kept there are not pages.
    pub async fn list(&self, subdir: &str) -> Result<Vec<String>> {
        let root = self.resolve(".")?;
        let start = if subdir.is_empty() {
            root.clone()
        } else {
            self.resolve(subdir)?
        };

        Ok(walk::list_files(&root, &start, &[ASSETS_DIR], is_page).await?)
    }

    /// Copy a page to a timestamped sibling.
    ///
    /// Returns `None` when the page does not exist.
    pub async fn backup(&self, page: &str) -> Result<Option<PathBuf>> {
        let path = self.resolve(page)?;
        let Some(name) = path.file_name() else {
            return Ok(None);
        };

        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup = path.with_file_name(format!("{}.{stamp}.bak", name.to_string_lossy()));

        match tokio::fs::copy(&path, &backup).await {
            Ok(_) => {
                info!(page, backup = %backup.display(), "backed up draft page");
                Ok(Some(backup))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Modification time of a file, `None` when it does not exist.
pub(crate) async fn modified(path: &Path) -> Result<Option<SystemTime>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(Some(meta.modified()?)),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Strip the page extension from a page path.
#[must_use]
pub fn page_stem(page: &str) -> &str {
    page.strip_suffix(PAGE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(page)
}
