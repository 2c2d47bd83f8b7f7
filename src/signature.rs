//! GitHub webhook signature verification (`X-Hub-Signature-256`).

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::error::RelayError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

/// Hex length of an HMAC-SHA256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

/// GitHub always sends lowercase hex; anything else is not its signature.
fn is_lowercase_hex_digest(digest: &str) -> bool {
    digest.len() == SIGNATURE_HEX_LEN
        && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Helper function for verifying GitHub webhook signature.
///
/// `payload` must be the exact bytes GitHub signed. Malformed headers are
/// reported as a mismatch.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let Some(git_signature) = signature_header.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };

    if !is_lowercase_hex_digest(git_signature) {
        return false;
    }

    let git_signature_bytes = match hex::decode(git_signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    // Constant-time comparison
    mac.verify_slice(&git_signature_bytes).is_ok()
}

/// Gates a request on its signature.
///
/// A missing header or an unset secret is `Unauthorized` and no HMAC is
/// computed; a signature that doesn't match is `Forbidden`.
pub fn authenticate(
    headers: &HeaderMap,
    body: &[u8],
    secret: Option<&str>,
) -> Result<(), RelayError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let (Some(signature), Some(secret)) = (signature, secret.filter(|s| !s.is_empty())) else {
        warn!("Rejecting request without signature header or configured secret");
        return Err(RelayError::Unauthorized);
    };

    if !verify_signature(body, signature, secret.as_bytes()) {
        warn!("Signature verification failed");
        return Err(RelayError::Forbidden);
    }

    Ok(())
}

/// Computes the raw HMAC-SHA256 of `payload` keyed with `secret`.
#[cfg(test)]
pub(crate) fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).unwrap();
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a raw signature the way GitHub sends it: `sha256=<hex>`.
#[cfg(test)]
pub(crate) fn format_signature_header(signature: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}
