//! LINE Login routes: login redirect, OAuth callback, and logout.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration as ChronoDuration;
use line_bridge_line::{LineApiError, LoginApi, MessagingApi, OutgoingMessage};
use line_bridge_platform_access::{
    PROVIDER_LINE, Session, SessionStore, UserStore, secret, store,
};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;

use super::{
    AppState,
    db::{SessionRepository, UserRepository, generate_session_id},
};

/// Session cookie name.
pub(crate) const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (CSRF protection during the login flow).
const AUTH_STATE_COOKIE: &str = "line_auth_state";

/// Message pushed to the user after a successful login.
const LOGIN_PUSH_TEXT: &str = "Logged in successfully";

/// Query parameters for the login callback.
///
/// `code` is absent when the provider redirects back with an error
/// (e.g. the user declined consent); that case must still collapse to
/// the generic failure redirect instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: Option<String>,
    state: String,
}

/// Initiates the login flow by redirecting to LINE's authorization page.
///
/// Generates a random state token, stores it in a short-lived cookie,
/// and redirects the browser to the provider (a cross-origin target).
pub async fn login(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let token = secret::state_token();
    let auth_url = state.login_client.authorization_url(&token);

    let cookie = Cookie::build((AUTH_STATE_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    (jar.add(cookie), Redirect::to(&auth_url))
}

/// Handles the callback after the user authenticates with LINE.
///
/// Every failure collapses to a redirect to the root with a generic
/// notice; only the error log carries detail.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    match run_callback(&state, &query, &jar).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(%error, "LINE login failed");
            let notice = match error {
                AuthError::StateMismatch | AuthError::MissingState => "Invalid access attempt",
                _ => "Login failed",
            };
            let jar = jar.clone().remove(state_cookie_removal());
            (jar, Redirect::to(&format!("/?notice={}", urlencode(notice)))).into_response()
        }
    }
}

async fn run_callback(
    state: &AppState,
    query: &CallbackQuery,
    jar: &CookieJar,
) -> Result<Response, AuthError> {
    let user_repo = UserRepository::new(state.db_pool.clone());
    let session_repo = SessionRepository::new(state.db_pool.clone());

    let session = complete_login(
        &state.login_client,
        &user_repo,
        &session_repo,
        state.messaging.as_ref(),
        query,
        jar.get(AUTH_STATE_COOKIE).map(|c| c.value()),
        ChronoDuration::minutes(state.session_config.duration_minutes),
    )
    .await?;

    let session_cookie = Cookie::build((SESSION_COOKIE, session.id().as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(state.session_config.duration_minutes));

    let jar = jar
        .clone()
        .add(session_cookie)
        .remove(state_cookie_removal());

    let target = format!("/static_pages/user?notice={}", urlencode(LOGIN_PUSH_TEXT));
    Ok((jar, Redirect::to(&target)).into_response())
}

/// The callback flow behind the HTTP layer.
///
/// The state check runs before anything else: on a missing or mismatched
/// token no provider call is made and no session is created. After a
/// verified identity, exactly one user exists for the subject, one
/// session is persisted, and one push message is sent.
async fn complete_login(
    login: &dyn LoginApi,
    users: &dyn UserStore,
    sessions: &dyn SessionStore,
    messaging: &dyn MessagingApi,
    query: &CallbackQuery,
    expected_state: Option<&str>,
    session_duration: ChronoDuration,
) -> Result<Session, AuthError> {
    // Validate the CSRF state token against the cookie set at initiation.
    let expected = expected_state.ok_or(AuthError::MissingState)?;
    if query.state != expected {
        return Err(AuthError::StateMismatch);
    }

    let code = query.code.as_deref().ok_or(AuthError::MissingCode)?;

    // Exchange the authorization code, then verify the ID token. Both
    // fail closed: no token, no user.
    let id_token = login.exchange_code(code).await?;
    let claims = login.verify_id_token(&id_token).await?;

    // Find or create the local user for this LINE identity.
    let user = store::find_or_create(
        users,
        PROVIDER_LINE,
        &claims.sub,
        claims.email.clone(),
        claims.name.clone(),
        claims.picture.clone(),
    )
    .await
    .map_err(|e| AuthError::Database(e.to_string()))?;

    // Establish the session.
    let session = Session::new(generate_session_id(), user.id(), session_duration);
    sessions
        .create(&session)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

    // The login has already succeeded at this point; a failed push is
    // logged and does not fail the callback.
    let message = OutgoingMessage::text(LOGIN_PUSH_TEXT);
    if let Err(error) = messaging.push_message(user.uid(), message).await {
        tracing::warn!(%error, uid = user.uid(), "post-login push message failed");
    }

    Ok(session)
}

/// Logs out the user by deleting their session.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let session_id =
            line_bridge_platform_access::SessionId::new(session_cookie.value().to_string());

        let session_repo = SessionRepository::new(state.db_pool.clone());
        let _ = session_repo.delete(&session_id).await;
    }

    let remove_session = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    (jar.add(remove_session), Redirect::to("/"))
}

fn state_cookie_removal() -> Cookie<'static> {
    Cookie::build((AUTH_STATE_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Authentication errors. All collapse to a generic redirect for the
/// browser; the variant only drives logging.
#[derive(Debug)]
enum AuthError {
    MissingState,
    StateMismatch,
    MissingCode,
    Line(LineApiError),
    Database(String),
}

impl From<LineApiError> for AuthError {
    fn from(error: LineApiError) -> Self {
        Self::Line(error)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingState => write!(f, "no auth state cookie on callback"),
            Self::StateMismatch => write!(f, "state token does not match session"),
            Self::MissingCode => write!(f, "no authorization code on callback"),
            Self::Line(error) => write!(f, "{error}"),
            Self::Database(reason) => write!(f, "database error: {reason}"),
        }
    }
}
