//! Publish status of a page.

use std::time::SystemTime;

use pressroom_core::{CoreError, Result, SiteLayout, layout::is_page_path};
use serde::Serialize;

use crate::pages::modified;

/// Whether a page is live and whether its draft has moved on since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishStatus {
    /// A public copy exists.
    pub is_published: bool,

    /// The draft was modified after the public copy. Always `false` when the
    /// page is not published.
    pub has_unpublished_changes: bool,
}

impl PublishStatus {
    /// Derive the status from the draft and (optional) public modification times.
    #[must_use]
    pub fn from_mtimes(draft: SystemTime, public: Option<SystemTime>) -> Self {
        match public {
            Some(public) => Self {
                is_published: true,
                has_unpublished_changes: draft > public,
            },
            None => Self {
                is_published: false,
                has_unpublished_changes: false,
            },
        }
    }
}

/// Compute the publish status of `page`.
///
/// # Errors
///
/// [`CoreError::NotFound`] when no draft exists, [`CoreError::PathTraversal`]
/// when the page path escapes either tree, [`CoreError::NotAPage`] for
/// assets and other non-page files.
pub async fn page_status(layout: &SiteLayout, page: &str) -> Result<PublishStatus> {
    let draft_path = layout.draft_page(page)?;
    let public_path = layout.public_page(page)?;
    if !is_page_path(page) {
        return Err(CoreError::not_a_page(page));
    }

    let draft = modified(&draft_path)
        .await?
        .ok_or_else(|| CoreError::not_found(page))?;
    let public = modified(&public_path).await?;

    Ok(PublishStatus::from_mtimes(draft, public))
}
