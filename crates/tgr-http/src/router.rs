use std::{future::Future, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use tgr_core::session::TelegramSession;

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<TelegramSession>,
}

impl AppState {
    pub fn new(session: Arc<TelegramSession>) -> Self {
        Self { session }
    }
}

/// Build the API router (shared between production startup and tests).
pub fn build_router(state: AppState) -> Router {
    // Callers are automation tools on other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/dialogs", get(handlers::dialogs))
        .route("/chat/{chat_id}/members", get(handlers::chat_members))
        .route("/chat/{chat_id}/messages", get(handlers::chat_messages))
        .route("/channel/{channel_id}/posts", get(handlers::channel_posts))
        .route(
            "/channel/{channel_id}/post/{post_id}/comments",
            get(handlers::post_comments),
        )
        .route("/send", post(handlers::send))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "server listening");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
