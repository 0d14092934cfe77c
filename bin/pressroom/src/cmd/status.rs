//! Status and list commands

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

use super::{load_config, publisher};

/// Run the status command for one page.
pub async fn run(config_path: &Path, page: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let publisher = publisher(&config).await;

    let status = publisher
        .status(page)
        .await
        .wrap_err_with(|| format!("Failed to get status of {page}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else if !status.is_published {
        println!("{page}: not published");
    } else if status.has_unpublished_changes {
        println!("{page}: published, draft has unpublished changes");
    } else {
        println!("{page}: published, up to date");
    }
    Ok(())
}

/// Run the list command, printing draft pages with their status.
pub async fn run_list(config_path: &Path, subdir: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let publisher = publisher(&config).await;

    let pages = publisher
        .drafts()
        .list(subdir)
        .await
        .wrap_err("Failed to list draft pages")?;

    for page in &pages {
        let marker = match publisher.status(page).await {
            Ok(status) if status.has_unpublished_changes => "*",
            Ok(status) if status.is_published => "✓",
            Ok(_) => " ",
            Err(e) => {
                tracing::warn!(page = %page, error = %e, "Failed to get page status");
                "?"
            }
        };
        println!("  {marker} {page}");
    }
    tracing::info!(count = pages.len(), "Listed draft pages");
    Ok(())
}
