//! Authentication extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use line_bridge_platform_access::{AuthenticatedUser, SessionId};
use std::sync::Arc;

use super::{
    AppState,
    db::{SessionRepository, UserRepository},
    routes::SESSION_COOKIE,
};

/// Extractor for requiring an authenticated user.
///
/// Unauthenticated requests are redirected to the login page.
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        let session_cookie = jar
            .get(SESSION_COOKIE)
            .ok_or(AuthRejection::NotAuthenticated)?;

        let session_id = SessionId::new(session_cookie.value().to_string());

        let session_repo = SessionRepository::new(app_state.db_pool.clone());
        let session = session_repo
            .find_by_id(&session_id)
            .await
            .map_err(|_| AuthRejection::InternalError)?
            .ok_or(AuthRejection::NotAuthenticated)?;

        if session.is_expired() {
            // Drop the stale row eagerly; the sweeper would get it later.
            let _ = session_repo.delete(&session_id).await;
            return Err(AuthRejection::SessionExpired);
        }

        let user_repo = UserRepository::new(app_state.db_pool.clone());
        let user = user_repo
            .find_by_id(session.user_id())
            .await
            .map_err(|_| AuthRejection::InternalError)?
            .ok_or(AuthRejection::NotAuthenticated)?;

        Ok(RequireAuth(AuthenticatedUser::new(session, user)))
    }
}

/// Rejections from the auth extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
    SessionExpired,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated | Self::SessionExpired => Redirect::to("/").into_response(),
            Self::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
