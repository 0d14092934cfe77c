//! Read-only preview server.
//!
//! Serves published pages with fingerprinted asset URLs and, when the
//! `draft` query flag is present, the draft page or the unfingerprinted
//! draft asset instead.

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::{Path, Query, Request, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use pressroom_core::{
    CoreError, SiteLayout,
    layout::{PAGE_EXTENSION, is_page},
    path_guard,
};
use pressroom_publish::{AssetManifest, PageStore};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Server state shared by all handlers.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub layout: SiteLayout,
    pub drafts: PageStore,
    pub manifest: AssetManifest,
}

impl ServerState {
    /// Create state for the given layout and manifest handle.
    pub fn new(layout: SiteLayout, manifest: AssetManifest) -> Self {
        Self {
            drafts: PageStore::new(layout.drafts_dir()),
            layout,
            manifest,
        }
    }
}

/// Query flags accepted by every route.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    /// Serve from the draft tree, unrewritten.
    pub draft: Option<String>,
}

impl PreviewQuery {
    fn is_draft(&self) -> bool {
        self.draft.is_some()
    }
}

/// Create the preview server router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/assets/{*path}", get(asset_handler))
        .route("/", get(index_handler))
        .route("/{*path}", get(page_handler))
        .with_state(state)
}

async fn index_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PreviewQuery>,
) -> Response {
    serve_page(&state, "index.html", &query).await
}

async fn page_handler(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<String>,
    Query(query): Query<PreviewQuery>,
    request: Request,
) -> Response {
    let page = page_for_url(&path);
    if is_page(&page) {
        return serve_page(&state, &page, &query).await;
    }

    // Non-page files in the public tree, e.g. sitemap.xml.
    match path_guard::resolve(&state.layout.public_dir(), &path) {
        Ok(_) => serve_dir(state.layout.public_dir(), request, request_path(&path)).await,
        Err(e) => error_response(&e),
    }
}

async fn asset_handler(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<String>,
    Query(query): Query<PreviewQuery>,
    request: Request,
) -> Response {
    let root = if query.is_draft() {
        state.layout.draft_assets_dir()
    } else {
        state.layout.public_assets_dir()
    };

    if let Err(e) = path_guard::resolve(&root, &path) {
        return error_response(&e);
    }
    serve_dir(root, request, request_path(&path)).await
}

async fn serve_page(state: &ServerState, page: &str, query: &PreviewQuery) -> Response {
    if query.is_draft() {
        return match state.drafts.get(page).await {
            Ok(Some(html)) => Html(html).into_response(),
            Ok(None) => error_response(&CoreError::not_found(page)),
            Err(e) => error_response(&e),
        };
    }

    let path = match state.layout.public_page(page) {
        Ok(path) => path,
        Err(e) => return error_response(&e),
    };
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(state.manifest.rewrite(&html).into_owned()).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error_response(&CoreError::not_found(page))
        }
        Err(e) => error_response(&CoreError::from(e)),
    }
}

async fn serve_dir(root: PathBuf, mut request: Request, path: String) -> Response {
    match path.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    }

    match ServeDir::new(root)
        .precompressed_br()
        .oneshot(request)
        .await
    {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn request_path(path: &str) -> String {
    let encoded: String = path
        .chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '%' => "%25".to_string(),
            '?' => "%3F".to_string(),
            '#' => "%23".to_string(),
            c => c.to_string(),
        })
        .collect();
    format!("/{encoded}")
}

/// Map a URL path to a page path.
///
/// `blog/` maps to `blog/index.html`, `about` to `about.html`.
fn page_for_url(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        return format!("{path}index.{PAGE_EXTENSION}");
    }

    let name = path.rsplit('/').next().unwrap_or(path);
    if name.contains('.') {
        path.to_string()
    } else {
        format!("{path}.{PAGE_EXTENSION}")
    }
}

fn error_response(err: &CoreError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_client_error() {
        tracing::debug!(error = %err, "rejected request");
    } else {
        tracing::error!(error = %err, "request failed");
    }
    (status, status.canonical_reason().unwrap_or("error")).into_response()
}
