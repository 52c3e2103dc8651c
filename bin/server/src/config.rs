//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables, with `__` separating nested sections
//! (e.g. `LOGIN__CHANNEL_ID`, `SESSION__DURATION_MINUTES`).

use serde::Deserialize;

/// Server configuration composed from section configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Listen configuration.
    #[serde(default)]
    pub server: ListenConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// LINE Login channel configuration.
    pub login: LineLoginConfig,

    /// Messaging API channel configuration.
    pub messaging: MessagingConfig,
}

/// Where the server listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Bind address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session duration in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between expired-session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

/// LINE Login channel credentials and callback target.
#[derive(Debug, Clone, Deserialize)]
pub struct LineLoginConfig {
    /// Channel ID of the LINE Login channel.
    pub channel_id: String,
    /// Channel secret of the LINE Login channel.
    pub channel_secret: String,
    /// Redirect URI registered with the channel
    /// (e.g. "https://app.example.com/line_login_api/callback").
    pub callback_url: String,
}

/// Messaging API channel credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    /// Channel secret used to validate webhook signatures.
    pub channel_secret: String,
    /// Long-lived channel access token for push/reply calls.
    pub channel_token: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_session_duration_minutes() -> i64 {
    60
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
