//! Pressroom Core Library
//!
//! Configuration, error handling, site layout and path safety shared by the
//! Pressroom publish pipeline.

pub mod config;
pub mod error;
pub mod layout;
pub mod path_guard;

pub use config::Config;
pub use error::{CoreError, Result};
pub use layout::SiteLayout;
