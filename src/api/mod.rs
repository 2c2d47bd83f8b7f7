//! HTTP surface of the relay
//!
//! Every path and method lands in the webhook handler: the path selects the
//! Discord destination and anything but POST is redirected.

pub mod webhook;

use axum::Router;
use axum::extract::DefaultBodyLimit;

pub use webhook::handle_webhook;

use crate::SharedState;

/// GitHub caps webhook payloads at 25 MB; axum's own default is 2 MB.
pub const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .fallback(handle_webhook)
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .with_state(state)
}
