//! HTTP surface (axum) for the Telegram gateway.
//!
//! Every endpoint is a thin call-through to `tgr_core::session::TelegramSession`.

pub mod error;
pub mod handlers;
pub mod router;

pub use error::ApiError;
pub use router::{build_router, serve, AppState};
