//! HTTP surface.
//!
//! | Route | Serves |
//! |-------|--------|
//! | `/assets/{name}` | a file from the asset directory |
//! | `/favicon.ico` | the current asset |
//! | anything else | the image-of-the-day page |
//!
//! Handlers only read the published filename from the
//! [`DailyRefresher`]; they never take the refresh lock and never touch the
//! image pool.

use crate::page::{ASSET_ROUTE, render_page};
use crate::refresh::DailyRefresher;
use axum::Router;
use axum::extract::{ConnectInfo, Path as UrlPath, State};
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared state injected into all route handlers via `State`.
#[derive(Clone)]
pub struct AppState {
    refresher: Arc<DailyRefresher>,
}

pub fn router(refresher: Arc<DailyRefresher>) -> Router {
    Router::new()
        .route(&format!("{ASSET_ROUTE}/{{name}}"), get(serve_asset))
        .route("/favicon.ico", get(serve_favicon))
        .fallback(serve_page)
        .with_state(AppState { refresher })
}

/// Bind `0.0.0.0:port` and serve until `cancel` fires.
pub async fn run(
    port: u16,
    refresher: Arc<DailyRefresher>,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve(listener, refresher, cancel).await
}

/// Serve on an already-bound listener until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    refresher: Arc<DailyRefresher>,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    let app = router(refresher).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(ServerError::Serve)
}

async fn serve_page(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
) -> Html<String> {
    info!("request from {remote}: {method} {}", uri.path());
    let current = state.refresher.current_filename();
    Html(render_page(current.as_deref()).into_string())
}

async fn serve_asset(State(state): State<AppState>, UrlPath(name): UrlPath<String>) -> Response {
    if !is_plain_filename(&name) {
        return StatusCode::NOT_FOUND.into_response();
    }
    send_file(state.refresher.asset_dir(), &name).await
}

async fn serve_favicon(State(state): State<AppState>) -> Response {
    match state.refresher.current_filename() {
        Some(name) => send_file(state.refresher.asset_dir(), &name).await,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A single path component that is not hidden and not a parent reference.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn content_type(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

async fn send_file(dir: &Path, name: &str) -> Response {
    match tokio::fs::read(dir.join(name)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(name))], bytes).into_response(),
        Err(e) => {
            debug!("asset {name} not served: {e}");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
