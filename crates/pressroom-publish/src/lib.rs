//! Pressroom Publish Library
//!
//! The draft to public publish pipeline.
//!
//! # Modules
//!
//! - [`pages`] - Draft page storage (read, save, delete, list, backup)
//! - [`assets`] - Asset fingerprinting, Brotli siblings and manifest writing
//! - [`manifest`] - Shared in-memory manifest and HTML rewriting
//! - [`publisher`] - Page promotion with post-publish hooks
//! - [`status`] - Published / unpublished-changes status of a page
//! - [`sitemap`] - XML sitemap generation from the public tree

pub mod assets;
pub mod manifest;
pub mod pages;
pub mod publisher;
pub mod sitemap;
pub mod status;
mod walk;

pub use assets::{AssetError, AssetPublishStats, AssetPublisher};
pub use manifest::AssetManifest;
pub use pages::PageStore;
pub use publisher::{
    HookReport, PageFailure, PostPublishHook, PublishError, PublishReport, Publisher,
};
pub use sitemap::{SitemapGenerator, SitemapStats};
pub use status::PublishStatus;
