//! Authentication module for the line-bridge server.
//!
//! This module provides:
//! - The LINE Login flow (login redirect, OAuth callback, logout)
//! - Database-backed session management
//! - The `RequireAuth` extractor for Axum routes
//!
//! Login establishes platform access only: any LINE identity that
//! completes the flow gets a local user and a session. There is no
//! group or role model; the service has a single access level.

pub mod db;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use line_bridge_line::{LoginClient, MessagingClient};
use sqlx::PgPool;

use crate::config::SessionConfig;

pub use middleware::RequireAuth;
pub use routes::{callback, login, logout};

/// Shared application state.
///
/// Both API clients are constructed once at startup and shared
/// immutably across requests.
pub struct AppState {
    /// Database connection pool.
    pub db_pool: PgPool,
    /// LINE Login client.
    pub login_client: LoginClient,
    /// Messaging API client (webhook validation and push/reply).
    pub messaging: Arc<MessagingClient>,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        db_pool: PgPool,
        login_client: LoginClient,
        messaging: Arc<MessagingClient>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            db_pool,
            login_client,
            messaging,
            session_config,
        }
    }
}
