//! Webhook signature validation.
//!
//! LINE signs each webhook delivery with HMAC-SHA256 over the raw body
//! using the channel secret, and sends the base64 digest in the
//! `X-Line-Signature` header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Validates a webhook signature against the raw request body.
///
/// Returns false for undecodable signatures rather than erroring; the
/// caller treats every failure the same way (reject the request). The
/// digest comparison itself is constant-time via `Mac::verify_slice`.
#[must_use]
pub fn validate(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    mac.verify_slice(&expected).is_ok()
}
