//! HTTP shim over the relay's [`Delegate`] hooks.

pub mod inbound;
pub mod retrieval;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tracing::error;

use dispatch_relay::Delegate;
use dispatch_types::api::ServerInfo;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub delegate: Arc<dyn Delegate>,
    pub info: ServerInfo,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/info", get(info))
        .route("/alerts", post(inbound::save_alert))
        .route("/mail/public", post(inbound::save_public_mail))
        .route("/mail/private", post(inbound::save_private_mail))
        .route("/mail/{id}", get(retrieval::get_message))
        .route("/inbox/{address}", get(retrieval::get_inbox))
        .route("/public/{address}", get(retrieval::get_public))
        .with_state(state)
}

async fn info(State(state): State<AppState>) -> Json<ServerInfo> {
    Json(state.info.clone())
}

/// Run a delegate call off the async runtime; the stores block on SQLite.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&dyn Delegate) -> T + Send + 'static,
    T: Send + 'static,
{
    let delegate = state.delegate.clone();
    tokio::task::spawn_blocking(move || f(delegate.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
