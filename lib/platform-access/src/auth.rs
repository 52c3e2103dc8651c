//! Authenticated request context.

use crate::session::Session;
use crate::user::User;
use line_bridge_core::UserId;

/// The authenticated user context extracted from a request.
///
/// Available in handlers after successful session validation. It pairs
/// the session with the user record it belongs to.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The current session.
    session: Session,
    /// The user record.
    user: User,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user context.
    #[must_use]
    pub fn new(session: Session, user: User) -> Self {
        Self { session, user }
    }

    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.session.user_id()
    }

    /// Returns the current session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the user record.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;
    use crate::user::PROVIDER_LINE;
    use chrono::Duration;

    #[test]
    fn context_exposes_session_user_id() {
        let user = User::new(PROVIDER_LINE, "U1", None, "pw".to_string());
        let session = Session::new(
            SessionId::new("sess_1".to_string()),
            user.id(),
            Duration::hours(1),
        );

        let auth = AuthenticatedUser::new(session, user.clone());
        assert_eq!(auth.user_id(), user.id());
        assert_eq!(auth.user().uid(), "U1");
    }
}
