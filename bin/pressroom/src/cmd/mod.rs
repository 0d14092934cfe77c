//! CLI command implementations.

pub mod publish;
pub mod serve;
pub mod sitemap;
pub mod status;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use pressroom_core::Config;
use pressroom_publish::{AssetManifest, Publisher};

/// Load configuration, falling back to defaults when the file is absent.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Build a publisher with the manifest loaded from disk.
pub async fn publisher(config: &Config) -> Publisher {
    let manifest = AssetManifest::load(config.layout().manifest_path()).await;
    Publisher::new(config, manifest)
}
