//! LINE API surface for line-bridge.
//!
//! This crate wraps the two LINE channels the service talks to:
//! - **LINE Login** (`LoginClient`): authorization URL assembly,
//!   authorization-code exchange, and ID-token verification.
//! - **Messaging API** (`MessagingClient`): push and reply messages, the
//!   webhook event model, and `X-Line-Signature` validation.
//!
//! Clients are immutable after construction and safe to share across
//! requests behind an `Arc`. No call is retried; callers see a
//! `LineApiError` per failed round trip.

pub mod error;
pub mod event;
pub mod login;
pub mod messaging;
pub mod signature;

pub use error::LineApiError;
pub use event::{EventSource, MessageContent, WebhookEvent, WebhookRequest};
pub use login::{IdTokenClaims, LoginApi, LoginClient};
pub use messaging::{MessagingApi, MessagingClient, OutgoingMessage};
