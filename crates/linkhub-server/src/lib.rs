//! HTTP surface for LinkHub.
//!
//! Public routes serve the link list, auth status and uploaded icons; add and
//! delete need the session cookie issued by `POST /api/login`.

pub mod error;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use linkhub_core::{actions::MAX_ICON_BYTES, Config, LinkHub, StorageLayout};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::handlers::{add_link, auth_status, delete_link, health, list_links, login, logout};

/// Request body cap. Twice the icon limit, so a slightly oversized icon is
/// still read and rejected with a field error instead of a dropped connection.
const MAX_BODY_BYTES: usize = MAX_ICON_BYTES * 2;

/// Shared state threaded through axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<LinkHub>,
    pub images_dir: PathBuf,
}

impl AppState {
    pub fn new(hub: LinkHub, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            hub: Arc::new(hub),
            images_dir: images_dir.into(),
        }
    }

    /// File-backed state for `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(LinkHub::from_config(config), config.images_dir())
    }
}

pub fn router(state: AppState) -> Router {
    let images = ServeDir::new(&state.images_dir);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth", get(auth_status))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/links", get(list_links).post(add_link))
        .route("/api/links/{id}", delete(delete_link))
        .nest_service("/images", images)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Prepare storage and serve until Ctrl+C.
pub async fn run(config: Config) -> Result<()> {
    StorageLayout::ensure_ready(&config)
        .with_context(|| format!("prepare storage under {}", config.root.display()))?;
    info!(root = %config.root.display(), "using data root");
    if !config.secure_cookies {
        warn!("session cookies are not marked Secure; set LINKHUB_SECURE_COOKIES behind HTTPS");
    }

    let app = router(AppState::from_config(&config));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!(addr = %addr, "linkhub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("linkhub shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
