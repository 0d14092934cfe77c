//! Serve command - read-only preview server

use std::{net::SocketAddr, path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use pressroom_publish::AssetManifest;
use tokio::net::TcpListener;

use super::load_config;
use crate::server::{ServerState, create_router};

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16) -> Result<()> {
    let config = load_config(config_path)?;
    let layout = config.layout();
    let manifest = AssetManifest::load(layout.manifest_path()).await;

    let state = Arc::new(ServerState::new(layout, manifest));
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Preview server running at http://{addr}");
    println!("  Append ?draft to any URL to view the draft");
    println!();
    tracing::info!(%addr, "Preview server started");

    axum::serve(listener, app)
        .await
        .wrap_err("Server error")?;
    Ok(())
}
