//! LINE Login client.
//!
//! Implements the three provider calls of the login flow:
//! 1. authorization URL assembly (browser redirect target),
//! 2. authorization-code exchange at the token endpoint,
//! 3. ID-token verification at the verify endpoint.
//!
//! See <https://developers.line.biz/en/docs/line-login/integrate-line-login/>.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::LineApiError;

/// LINE Login authorization endpoint.
const AUTHORIZATION_ENDPOINT: &str = "https://access.line.me/oauth2/v2.1/authorize";

/// LINE Login token endpoint.
const TOKEN_ENDPOINT: &str = "https://api.line.me/oauth2/v2.1/token";

/// LINE Login ID-token verify endpoint.
const VERIFY_ENDPOINT: &str = "https://api.line.me/oauth2/v2.1/verify";

/// Scope requested for every login.
const LOGIN_SCOPE: &str = "profile%20openid";

/// Claims asserted by a verified LINE ID token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    /// Provider-issued subject identifier.
    pub sub: String,
    /// Email address, when the user granted the email scope.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile picture URL.
    #[serde(default)]
    pub picture: Option<String>,
}

/// Provider calls of the login flow.
///
/// Handlers depend on this trait so the callback flow can be exercised
/// against a stub instead of the live endpoints.
#[async_trait]
pub trait LoginApi: Send + Sync {
    /// Exchanges an authorization code for an ID token.
    ///
    /// Fails closed on any non-success response or on a success response
    /// that carries no ID token.
    async fn exchange_code(&self, code: &str) -> Result<String, LineApiError>;

    /// Verifies an ID token with the provider and extracts its claims.
    ///
    /// Fails closed on any non-success response.
    async fn verify_id_token(&self, id_token: &str) -> Result<IdTokenClaims, LineApiError>;
}

/// Client for the LINE Login channel.
///
/// Immutable after construction; build one at startup and share it.
pub struct LoginClient {
    channel_id: String,
    channel_secret: String,
    callback_url: String,
    http: reqwest::Client,
}

impl LoginClient {
    /// Creates a new login client for a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        channel_id: String,
        channel_secret: String,
        callback_url: String,
    ) -> Result<Self, LineApiError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| LineApiError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            channel_id,
            channel_secret,
            callback_url,
            http,
        })
    }

    /// Builds the authorization URL for redirecting the browser.
    ///
    /// Embeds the configured client ID, the percent-encoded callback URL,
    /// the caller's CSRF state token, and the fixed `profile openid`
    /// scope.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let redirect_uri: String =
            url::form_urlencoded::byte_serialize(self.callback_url.as_bytes()).collect();

        format!(
            "{AUTHORIZATION_ENDPOINT}?response_type=code&client_id={}&redirect_uri={}&state={}&scope={LOGIN_SCOPE}",
            self.channel_id, redirect_uri, state
        )
    }
}

#[async_trait]
impl LoginApi for LoginClient {
    async fn exchange_code(&self, code: &str) -> Result<String, LineApiError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            #[serde(default)]
            id_token: Option<String>,
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.callback_url),
            ("client_id", &self.channel_id),
            ("client_secret", &self.channel_secret),
        ];

        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| LineApiError::TokenExchange {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LineApiError::TokenExchange {
                reason: format!("token endpoint returned {}", response.status()),
            });
        }

        let body: TokenResponse =
            response.json().await.map_err(|e| LineApiError::Decode {
                reason: e.to_string(),
            })?;

        body.id_token
            .filter(|t| !t.is_empty())
            .ok_or(LineApiError::TokenExchange {
                reason: "no ID token in response".to_string(),
            })
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<IdTokenClaims, LineApiError> {
        let params = [("id_token", id_token), ("client_id", &self.channel_id)];

        let response = self
            .http
            .post(VERIFY_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| LineApiError::Verification {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LineApiError::Verification {
                reason: format!("verify endpoint returned {}", response.status()),
            });
        }

        response.json().await.map_err(|e| LineApiError::Decode {
            reason: e.to_string(),
        })
    }
}
