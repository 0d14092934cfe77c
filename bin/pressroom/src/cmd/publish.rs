//! Publish and unpublish commands

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use pressroom_publish::PublishReport;

use super::{load_config, publisher};

/// Run the publish command.
///
/// Publishes one page when `page` is given, otherwise every draft page.
pub async fn run(config_path: &Path, page: Option<&str>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let publisher = publisher(&config).await;

    let report = match page {
        Some(page) => {
            tracing::info!(page, "Publishing page");
            publisher
                .publish_one(page)
                .await
                .wrap_err_with(|| format!("Failed to publish {page}"))?
        }
        None => {
            tracing::info!("Publishing all pages");
            publisher
                .publish_all()
                .await
                .wrap_err("Failed to publish pages")?
        }
    };

    print_report(&report, json)?;
    if !report.errors.is_empty() {
        bail!("{} page(s) failed to publish", report.errors.len());
    }
    Ok(())
}

/// Run the unpublish command.
pub async fn run_unpublish(config_path: &Path, page: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let publisher = publisher(&config).await;

    let report = publisher
        .unpublish(page)
        .await
        .wrap_err_with(|| format!("Failed to unpublish {page}"))?;

    print_report(&report, json)
}

/// Print a publish report as text or JSON.
pub fn print_report(report: &PublishReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    if report.is_complete() {
        println!("  Publish completed successfully!");
    } else {
        println!("  Publish completed with errors.");
    }
    println!();
    for page in &report.published {
        println!("  ✓ published   {page}");
    }
    for page in &report.unpublished {
        println!("  ✓ unpublished {page}");
    }
    for failure in &report.errors {
        println!("  ✗ {}: {}", failure.path, failure.error);
    }
    for hook in &report.hooks {
        match &hook.error {
            None => println!("  ✓ {}", hook.hook),
            Some(error) => println!("  ⚠ {}: {error}", hook.hook),
        }
    }
    println!();
    Ok(())
}
