//! Pressroom CLI Library
//!
//! Command implementations and the preview server behind the `pressroom`
//! binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (publish, unpublish, status, list, sitemap, serve)
//! - [`server`] - Read-only preview server

pub mod cmd;
pub mod server;

pub use pressroom_core::Config;
pub use pressroom_publish::{AssetManifest, PublishReport, Publisher};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
