//! Random secret generation.
//!
//! Two kinds of opaque secret are needed by the login flow: the CSRF
//! state token roundtripped through the OAuth redirect, and the
//! throwaway password stored on users created from a provider identity.
//! Both are URL-safe base64 over OS entropy.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Length in characters of generated throwaway passwords.
const PASSWORD_LEN: usize = 20;

/// Generates a cryptographically random URL-safe state token.
#[must_use]
pub fn state_token() -> String {
    random_urlsafe(32)
}

/// Generates a random throwaway password for a provider-created user.
///
/// The password is never used to log in via the provider; it only
/// satisfies the user store's password requirement.
#[must_use]
pub fn throwaway_password() -> String {
    let mut token = random_urlsafe(PASSWORD_LEN);
    token.truncate(PASSWORD_LEN);
    token
}

fn random_urlsafe(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    getrandom::fill(&mut buf).expect("OS entropy source unavailable");
    URL_SAFE_NO_PAD.encode(buf)
}
