//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    layout::SiteLayout,
};

/// Highest quality level accepted by the Brotli encoder.
pub const MAX_BROTLI_QUALITY: u32 = 11;

/// Main configuration structure for Pressroom.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// File system locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Asset publishing settings.
    #[serde(default)]
    pub assets: AssetsConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL prepended to sitemap locations (e.g., "https://example.com").
    #[serde(default)]
    pub base_url: String,
}

/// File system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the `drafts/` and `public/` trees.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

/// Asset publishing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Brotli quality for precompressed siblings (0-11).
    #[serde(default = "default_brotli_quality")]
    pub brotli_quality: u32,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_brotli_quality() -> u32 {
    MAX_BROTLI_QUALITY
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            brotli_quality: default_brotli_quality(),
        }
    }
}

impl SiteConfig {
    /// Get the full URL for a site path.
    ///
    /// With an empty base URL the result is the path alone, rooted at `/`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl Config {
    /// Load configuration from a TOML file layered with `PRESSROOM__*`
    /// environment overrides. A missing file yields the defaults.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("PRESSROOM").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.assets.brotli_quality > MAX_BROTLI_QUALITY {
            return Err(CoreError::config(format!(
                "assets.brotli_quality must be at most {MAX_BROTLI_QUALITY}"
            )));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Directory layout derived from `paths.base_dir`.
    #[must_use]
    pub fn layout(&self) -> SiteLayout {
        SiteLayout::new(&self.paths.base_dir)
    }
}
