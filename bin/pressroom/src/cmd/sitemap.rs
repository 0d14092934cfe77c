//! Sitemap command - regenerates sitemap.xml from the public tree

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use pressroom_publish::SitemapGenerator;

use super::load_config;

/// Run the sitemap command.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let generator = SitemapGenerator::from_config(&config);

    let stats = generator
        .generate()
        .await
        .wrap_err("Failed to generate sitemap")?;

    println!("  Pages:   {}", stats.page_count);
    println!("  Sitemap: {}", stats.path.display());
    Ok(())
}
