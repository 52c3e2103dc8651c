//! Error types for LINE API calls.

use std::fmt;

/// Errors from LINE Login and Messaging API operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineApiError {
    /// Client construction or configuration failed.
    Configuration { reason: String },
    /// The token endpoint refused the authorization code, or its
    /// response carried no ID token.
    TokenExchange { reason: String },
    /// The verify endpoint refused the ID token.
    Verification { reason: String },
    /// A Messaging API call (push/reply) failed.
    Messaging { reason: String },
    /// A response body could not be decoded.
    Decode { reason: String },
}

impl fmt::Display for LineApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "LINE client configuration error: {reason}"),
            Self::TokenExchange { reason } => write!(f, "LINE token exchange failed: {reason}"),
            Self::Verification { reason } => write!(f, "LINE ID token verification failed: {reason}"),
            Self::Messaging { reason } => write!(f, "LINE Messaging API call failed: {reason}"),
            Self::Decode { reason } => write!(f, "failed to decode LINE response: {reason}"),
        }
    }
}

impl std::error::Error for LineApiError {}
