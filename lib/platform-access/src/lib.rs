//! User accounts, sessions, and login secrets for line-bridge.
//!
//! This crate provides:
//! - User management (`User`, keyed by the `(provider, uid)` pair)
//! - Session management (`Session`, `SessionId`)
//! - The `UserStore` persistence seam and its find-or-create helper
//! - Random secret generation (CSRF state tokens, throwaway passwords)
//!
//! Users are created the first time a LINE identity is seen, either by a
//! successful login callback or by an inbound follow/message webhook event.
//! Creation is idempotent on the `(provider, uid)` pair; users are never
//! deleted by this subsystem.

pub mod auth;
pub mod error;
pub mod secret;
pub mod session;
pub mod store;
pub mod user;

pub use auth::AuthenticatedUser;
pub use error::StoreError;
pub use session::{Session, SessionId};
pub use store::{SessionStore, UserStore, find_or_create};
pub use user::{PROVIDER_LINE, User};
