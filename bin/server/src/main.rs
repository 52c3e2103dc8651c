use axum::{
    Router,
    routing::{get, post},
};
use line_bridge_line::{LoginClient, MessagingClient};
use line_bridge_server::{
    auth::{self, AppState, db::SessionRepository},
    config::ServerConfig,
    pages, webhook,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    // Cleanup expired sessions on startup
    let session_repo = SessionRepository::new(db_pool.clone());
    match session_repo.delete_expired().await {
        Ok(count) if count > 0 => {
            tracing::info!(
                deleted_sessions = count,
                "Cleaned up expired sessions on startup"
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to cleanup expired sessions on startup");
        }
    }

    // Spawn periodic session cleanup task
    let cleanup_pool = db_pool.clone();
    let cleanup_interval_secs = config.session.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            let repo = SessionRepository::new(cleanup_pool.clone());
            match repo.delete_expired().await {
                Ok(count) if count > 0 => {
                    tracing::debug!(deleted_sessions = count, "Periodic session cleanup");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to cleanup expired sessions");
                }
            }
        }
    });

    // Initialize the two LINE channel clients
    let login_client = LoginClient::new(
        config.login.channel_id,
        config.login.channel_secret,
        config.login.callback_url,
    )
    .expect("failed to create LINE Login client");
    let messaging = Arc::new(
        MessagingClient::new(config.messaging.channel_secret, config.messaging.channel_token)
            .expect("failed to create Messaging API client"),
    );

    // Create application state
    let app_state = Arc::new(AppState::new(
        db_pool,
        login_client,
        messaging,
        config.session,
    ));

    let app = Router::new()
        // Pages
        .route("/", get(pages::login_page))
        .route("/static_pages/login", get(pages::login_page))
        .route("/static_pages/user", get(pages::user_page))
        // LINE Login flow
        .route("/line_login_api/login", get(auth::login))
        .route("/line_login_api/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        // Messaging API webhook
        .route("/line_message_api/callback", post(webhook::callback))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = config.server.listen_addr;
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
