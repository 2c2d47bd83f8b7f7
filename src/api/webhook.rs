//! Webhook handler for GitHub push events

use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::SharedState;
use crate::classify::classify;
use crate::dispatch::dispatch;
use crate::error::RelayError;
use crate::github::PushEvent;
use crate::routes::normalize_path;
use crate::signature::authenticate;

const EVENT_HEADER: &str = "x-github-event";
const DELIVERY_HEADER: &str = "x-github-delivery";

/// Handles every inbound request.
///
/// Non-POST requests are redirected to the repository. POSTs must carry a
/// valid `X-Hub-Signature-256`; `ping` is acknowledged, `push` is relayed to
/// the Discord webhook routed from the request path, and any other event is
/// accepted and ignored.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        debug!("{} {}; redirecting to repository", method, uri.path());
        return (
            StatusCode::FOUND,
            [(header::LOCATION, state.repository_url.clone())],
        )
            .into_response();
    }

    match process_webhook(&state, uri.path(), &headers, &body).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn process_webhook(
    state: &SharedState,
    path: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<String, RelayError> {
    // Verify against the raw bytes, before anything is parsed.
    authenticate(headers, body, state.webhook_secret.as_deref())?;

    let event_name = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok());
    match event_name {
        Some("push") => {}
        Some("ping") => {
            info!("Received GitHub ping");
            return Ok("Ping received".to_string());
        }
        other => {
            // A missing header reports as "unknown".
            let name = other.unwrap_or("unknown");
            debug!("Not push event; Received {} event", name);
            return Ok(format!("Event {} not handled", name));
        }
    }

    let delivery_id = headers
        .get(DELIVERY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    info!("Received push event with ID {}", delivery_id);

    let event: PushEvent = serde_json::from_slice(body).inspect_err(|e| {
        warn!("Could not parse push payload {}: {}", delivery_id, e);
    })?;

    let destination = state.routes.resolve(path).ok_or_else(|| {
        warn!("No Discord webhook configured for path '{}'", path);
        RelayError::Unconfigured(normalize_path(path).to_string())
    })?;

    let change = classify(&event.reference, &event.before, &event.after).inspect_err(|e| {
        warn!("Push {} in {}: {}", delivery_id, event.repository.name, e);
    })?;

    dispatch(state.deliverer.as_ref(), destination, &change, &event).await?;

    Ok("Notification sent".to_string())
}
