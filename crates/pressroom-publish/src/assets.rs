//! Asset publishing with content fingerprinting.
//!
//! Copies the draft asset tree into the public asset tree under
//! content-addressed names, writes a Brotli sibling next to each copy and
//! records the mapping in the manifest.

use std::{
    collections::BTreeMap,
    io::{self, Write},
    path::PathBuf,
};

use md5::{Digest, Md5};
use pressroom_core::{Config, SiteLayout};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{manifest::AssetManifest, walk};

/// Suffix of precompressed siblings. Such files are regenerated, never copied.
pub const COMPRESSED_SUFFIX: &str = ".br";

/// Brotli sliding window size (log2).
const BROTLI_WINDOW: u32 = 22;

/// Asset publishing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Manifest serialization error.
    #[error("manifest serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Asset compression task failed.
    #[error("compression failed for {path}: {message}")]
    Compression { path: String, message: String },
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Statistics for one asset publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetPublishStats {
    /// Number of assets published.
    pub assets: usize,

    /// Total uncompressed bytes written.
    pub bytes: u64,

    /// Total Brotli bytes written.
    pub compressed_bytes: u64,
}

/// Publishes the draft asset tree into the public asset tree.
#[derive(Debug, Clone)]
pub struct AssetPublisher {
    source_dir: PathBuf,
    dest_dir: PathBuf,
    manifest: AssetManifest,
    brotli_quality: u32,
}

impl AssetPublisher {
    /// Create a publisher for the layout's asset trees.
    ///
    /// `manifest` is reloaded from the freshly written file after every run.
    #[must_use]
    pub fn new(layout: &SiteLayout, manifest: AssetManifest) -> Self {
        Self {
            source_dir: layout.draft_assets_dir(),
            dest_dir: layout.public_assets_dir(),
            manifest,
            brotli_quality: pressroom_core::config::MAX_BROTLI_QUALITY,
        }
    }

    /// Create a publisher configured from `config`.
    #[must_use]
    pub fn from_config(config: &Config, manifest: AssetManifest) -> Self {
        Self::new(&config.layout(), manifest).with_brotli_quality(config.assets.brotli_quality)
    }

    /// Set the Brotli quality level (0-11).
    #[must_use]
    pub fn with_brotli_quality(mut self, quality: u32) -> Self {
        self.brotli_quality = quality;
        self
    }

    /// Publish every draft asset and rewrite the manifest.
    ///
    /// A missing draft asset root publishes nothing and writes an empty
    /// manifest. Any failure on an individual asset aborts the run.
    pub async fn publish(&self) -> Result<AssetPublishStats> {
        info!(
            source = %self.source_dir.display(),
            dest = %self.dest_dir.display(),
            "publishing assets"
        );

        let files = walk::list_files(&self.source_dir, &self.source_dir, &[], |name| {
            !name.ends_with(COMPRESSED_SUFFIX)
        })
        .await?;

        let mut stats = AssetPublishStats::default();
        let mut entries = BTreeMap::new();

        for relative in files {
            let (fingerprinted, written) = self.publish_file(&relative).await?;
            stats.assets += 1;
            stats.bytes += written.0;
            stats.compressed_bytes += written.1;
            entries.insert(relative, fingerprinted);
        }

        self.write_manifest(&entries).await?;
        self.manifest.reload().await;

        info!(
            assets = stats.assets,
            bytes = stats.bytes,
            compressed_bytes = stats.compressed_bytes,
            "assets published"
        );
        Ok(stats)
    }

    /// Publish one asset, returning its fingerprinted path and bytes written.
    async fn publish_file(&self, relative: &str) -> Result<(String, (u64, u64))> {
        let source = self.source_dir.join(relative);
        let bytes = tokio::fs::read(&source).await?;

        let hash = content_hash(&bytes);
        let fingerprinted = fingerprinted_path(relative, &hash);
        let dest = self.dest_dir.join(&fingerprinted);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, &bytes).await?;

        let quality = self.brotli_quality;
        let raw_len = bytes.len() as u64;
        let compressed = tokio::task::spawn_blocking(move || compress(&bytes, quality))
            .await
            .map_err(|e| AssetError::Compression {
                path: relative.to_string(),
                message: e.to_string(),
            })??;

        let mut br_path = dest.into_os_string();
        br_path.push(COMPRESSED_SUFFIX);
        tokio::fs::write(&br_path, &compressed).await?;

        debug!(
            asset = relative,
            fingerprinted = %fingerprinted,
            bytes = raw_len,
            compressed = compressed.len(),
            "published asset"
        );

        Ok((fingerprinted, (raw_len, compressed.len() as u64)))
    }

    /// Write the manifest via a temporary file so readers never see half of it.
    async fn write_manifest(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let path = self.manifest.path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!(path = %path.display(), count = entries.len(), "wrote asset manifest");
        Ok(())
    }
}

/// Hex MD5 digest of the content. A cache key, not a security boundary.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Insert `.<hash>` before the final extension of the file name.
///
/// Names without an extension, including dot-files, get the hash appended.
#[must_use]
pub fn fingerprinted_path(relative: &str, hash: &str) -> String {
    let (dir, name) = match relative.rfind('/') {
        Some(idx) => relative.split_at(idx + 1),
        None => ("", relative),
    };

    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let (stem, ext) = name.split_at(idx);
            format!("{dir}{stem}.{hash}{ext}")
        }
        _ => format!("{dir}{name}.{hash}"),
    }
}

/// Brotli-compress a buffer.
pub fn compress(bytes: &[u8], quality: u32) -> io::Result<Vec<u8>> {
    let mut writer = brotli::CompressorWriter::new(
        Vec::with_capacity(bytes.len() / 2),
        4096,
        quality,
        BROTLI_WINDOW,
    );
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Read};

    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, SiteLayout, AssetPublisher) {
        let dir = TempDir::new().unwrap();
        let layout = SiteLayout::new(dir.path());
        let manifest = AssetManifest::new(layout.manifest_path());
        let publisher = AssetPublisher::new(&layout, manifest).with_brotli_quality(5);
        (dir, layout, publisher)
    }

    fn write_asset(layout: &SiteLayout, relative: &str, content: &[u8]) {
        let path = layout.draft_assets_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read_manifest(layout: &SiteLayout) -> BTreeMap<String, String> {
        serde_json::from_str(&fs::read_to_string(layout.manifest_path()).unwrap()).unwrap()
    }

    #[test]
    fn test_fingerprinted_path() {
        assert_eq!(
            fingerprinted_path("css/bootstrap.min.css", "abc"),
            "css/bootstrap.min.abc.css"
        );
        assert_eq!(fingerprinted_path("main.js", "abc"), "main.abc.js");
        assert_eq!(fingerprinted_path("docs/LICENSE", "abc"), "docs/LICENSE.abc");
        assert_eq!(fingerprinted_path(".htaccess", "abc"), ".htaccess.abc");
        assert_eq!(
            fingerprinted_path("v1.2/logo.png", "abc"),
            "v1.2/logo.abc.png"
        );
    }

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash(b"body { color: red; }");
        assert_eq!(a, content_hash(b"body { color: red; }"));
        assert_eq!(a.len(), 32);
        assert_ne!(a, content_hash(b"body { color: blue; }"));
        assert_eq!(content_hash(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_compress_round_trips() {
        let input = b"body { color: red; } ".repeat(50);
        let compressed = compress(&input, 5).unwrap();
        assert!(compressed.len() < input.len());

        let mut output = Vec::new();
        brotli::Decompressor::new(compressed.as_slice(), 4096)
            .read_to_end(&mut output)
            .unwrap();
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn test_publish_writes_fingerprinted_copy_and_sibling() {
        let (_dir, layout, publisher) = setup();
        write_asset(&layout, "css/main.css", b"body { margin: 0; }");

        let stats = publisher.publish().await.unwrap();
        assert_eq!(stats.assets, 1);

        let hash = content_hash(b"body { margin: 0; }");
        let expected = format!("css/main.{hash}.css");
        let published = layout.public_assets_dir().join(&expected);

        assert_eq!(fs::read(&published).unwrap(), b"body { margin: 0; }");
        assert!(
            layout
                .public_assets_dir()
                .join(format!("{expected}.br"))
                .exists()
        );
        assert_eq!(
            read_manifest(&layout).get("css/main.css"),
            Some(&expected)
        );
    }

    #[tokio::test]
    async fn test_publish_is_idempotent() {
        let (_dir, layout, publisher) = setup();
        write_asset(&layout, "css/main.css", b"body {}");
        write_asset(&layout, "js/app.js", b"console.log(1)");

        publisher.publish().await.unwrap();
        let first = read_manifest(&layout);
        let first_bytes = fs::read(layout.public_assets_dir().join(&first["js/app.js"])).unwrap();

        publisher.publish().await.unwrap();
        let second = read_manifest(&layout);
        let second_bytes =
            fs::read(layout.public_assets_dir().join(&second["js/app.js"])).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[tokio::test]
    async fn test_changed_file_changes_only_its_fingerprint() {
        let (_dir, layout, publisher) = setup();
        write_asset(&layout, "css/main.css", b"body {}");
        write_asset(&layout, "js/app.js", b"console.log(1)");
        publisher.publish().await.unwrap();
        let before = read_manifest(&layout);

        write_asset(&layout, "js/app.js", b"console.log(2)");
        publisher.publish().await.unwrap();
        let after = read_manifest(&layout);

        assert_eq!(before["css/main.css"], after["css/main.css"]);
        assert_ne!(before["js/app.js"], after["js/app.js"]);
    }

    #[tokio::test]
    async fn test_distinct_contents_get_distinct_names() {
        let (_dir, layout, publisher) = setup();
        write_asset(&layout, "a/logo.svg", b"<svg>a</svg>");
        write_asset(&layout, "b/logo.svg", b"<svg>b</svg>");
        publisher.publish().await.unwrap();

        let manifest = read_manifest(&layout);
        let a = manifest["a/logo.svg"].trim_start_matches("a/");
        let b = manifest["b/logo.svg"].trim_start_matches("b/");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_skips_compressed_drafts() {
        let (_dir, layout, publisher) = setup();
        write_asset(&layout, "css/main.css", b"body {}");
        write_asset(&layout, "css/main.css.br", b"stale");

        let stats = publisher.publish().await.unwrap();

        assert_eq!(stats.assets, 1);
        assert!(!read_manifest(&layout).contains_key("css/main.css.br"));
    }

    #[tokio::test]
    async fn test_missing_source_publishes_nothing() {
        let (_dir, layout, publisher) = setup();

        let stats = publisher.publish().await.unwrap();

        assert_eq!(stats, AssetPublishStats::default());
        assert!(read_manifest(&layout).is_empty());
    }

    #[tokio::test]
    async fn test_publish_reloads_manifest() {
        let dir = TempDir::new().unwrap();
        let layout = SiteLayout::new(dir.path());
        let manifest = AssetManifest::new(layout.manifest_path());
        let publisher = AssetPublisher::new(&layout, manifest.clone()).with_brotli_quality(1);
        write_asset(&layout, "css/main.css", b"body {}");

        publisher.publish().await.unwrap();

        let hash = content_hash(b"body {}");
        assert_eq!(
            manifest.get("css/main.css"),
            Some(format!("css/main.{hash}.css"))
        );
    }
}
