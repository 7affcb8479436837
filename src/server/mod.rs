//! HTTP surface: the Telegram webhook and a liveness probe.
//!
//! The webhook acknowledges every request with `200 OK`, whatever happens
//! while handling it. Telegram redelivers updates that get an error
//! response, so failures are logged instead of returned.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::commands::{CommandRouter, InboundEvent};
use crate::telegram::Update;

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CommandRouter>,

    /// Last path segment the webhook must be called with (the bot token).
    pub webhook_secret: Arc<str>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

/// Builds the HTTP routes: `GET /` and `POST /webhook/{secret}`.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/webhook/:secret", post(webhook))
        .with_state(state)
}

/// Serves `app` on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn alive() -> Json<Value> {
    Json(json!({ "alive": true }))
}

async fn webhook(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    body: Bytes,
) -> StatusCode {
    if secret != *state.webhook_secret {
        return StatusCode::NOT_FOUND;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Ignoring undecodable update: {}", e);
            return StatusCode::OK;
        }
    };

    match InboundEvent::from_update(&update) {
        Some(event) => {
            debug!(
                "Update {} from {} in chat {}",
                update.update_id, event.sender_id, event.chat_id
            );
            state.router.process(&event).await;
        }
        None => debug!("Update {} carries no text message", update.update_id),
    }

    StatusCode::OK
}
