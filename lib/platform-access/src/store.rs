//! Persistence seam for user records.
//!
//! Handlers depend on the `UserStore` trait rather than a concrete
//! repository so the login and webhook flows can be exercised against an
//! in-memory double. The Postgres implementation lives in the server
//! binary.

use async_trait::async_trait;
use line_bridge_core::Result;

use crate::error::StoreError;
use crate::secret;
use crate::session::Session;
use crate::user::User;

/// Storage operations needed by the login callback and webhook handlers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by their provider and provider-issued uid.
    async fn find_by_provider_uid(
        &self,
        provider: &str,
        uid: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Persists a new user.
    async fn create(&self, user: &User) -> Result<(), StoreError>;
}

/// Session persistence needed by the login callback.
///
/// Lookup and deletion stay on the concrete repository; only creation
/// sits behind the seam, since only the callback flow establishes
/// sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session.
    async fn create(&self, session: &Session) -> Result<(), StoreError>;
}

/// Looks up the user for `(provider, uid)`, creating one if absent.
///
/// An existing record is returned untouched. A new record gets the
/// provided email (or the synthesized fallback when `None`), the optional
/// profile fields, and a fresh throwaway password. Repeated delivery of
/// the same identity is idempotent: at most one user exists per
/// `(provider, uid)`.
pub async fn find_or_create(
    store: &dyn UserStore,
    provider: &str,
    uid: &str,
    email: Option<String>,
    display_name: Option<String>,
    picture_url: Option<String>,
) -> Result<User, StoreError> {
    if let Some(existing) = store.find_by_provider_uid(provider, uid).await? {
        return Ok(existing);
    }

    let mut user = User::new(provider, uid, email, secret::throwaway_password());
    if display_name.is_some() {
        user.set_display_name(display_name);
    }
    if picture_url.is_some() {
        user.set_picture_url(picture_url);
    }

    store.create(&user).await?;
    tracing::info!(user_id = %user.id(), uid, "created user for provider identity");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::PROVIDER_LINE;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn find_by_provider_uid(
            &self,
            provider: &str,
            uid: &str,
        ) -> Result<Option<User>, StoreError> {
            let users = self.users.lock().expect("lock");
            Ok(users
                .iter()
                .find(|u| u.provider() == provider && u.uid() == uid)
                .cloned())
        }

        async fn create(&self, user: &User) -> Result<(), StoreError> {
            let mut users = self.users.lock().expect("lock");
            if users
                .iter()
                .any(|u| u.provider() == user.provider() && u.uid() == user.uid())
            {
                return Err(StoreError::backend("duplicate (provider, uid)").into());
            }
            users.push(user.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn creates_user_when_absent() {
        let store = MemoryStore::default();

        let user = find_or_create(&store, PROVIDER_LINE, "U1", None, None, None)
            .await
            .expect("find_or_create");

        assert_eq!(user.email(), "U1-line@example.com");
        assert_eq!(store.users.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn reuses_existing_user() {
        let store = MemoryStore::default();

        let first = find_or_create(
            &store,
            PROVIDER_LINE,
            "U1",
            Some("alice@example.com".to_string()),
            Some("Alice".to_string()),
            None,
        )
        .await
        .expect("first");

        // Second delivery of the same identity must not create another row.
        let second = find_or_create(&store, PROVIDER_LINE, "U1", None, None, None)
            .await
            .expect("second");

        assert_eq!(first.id(), second.id());
        assert_eq!(second.email(), "alice@example.com");
        assert_eq!(store.users.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn profile_fields_are_applied_on_creation() {
        let store = MemoryStore::default();

        let user = find_or_create(
            &store,
            PROVIDER_LINE,
            "U2",
            None,
            Some("Bob".to_string()),
            Some("https://example.com/bob.png".to_string()),
        )
        .await
        .expect("find_or_create");

        assert_eq!(user.display_name(), Some("Bob"));
        assert_eq!(user.picture_url(), Some("https://example.com/bob.png"));
    }
}
