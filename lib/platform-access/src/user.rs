//! User domain type.
//!
//! A user is identified by the `(provider, uid)` pair, where `uid` is the
//! subject identifier issued by the provider. Email is mandatory in the
//! local store; when the provider supplies none, a synthetic fallback
//! address is derived from the uid.

use chrono::{DateTime, Utc};
use line_bridge_core::UserId;
use serde::{Deserialize, Serialize};

/// The provider tag for users created through LINE Login or the LINE webhook.
pub const PROVIDER_LINE: &str = "line";

/// A local user record backing a provider identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal user ID.
    id: UserId,
    /// Identity provider tag (always "line" in this service).
    provider: String,
    /// Provider-issued subject identifier.
    uid: String,
    /// Email address, synthesized from the uid when the provider has none.
    email: String,
    /// Display name from the provider, if known.
    display_name: Option<String>,
    /// Profile picture URL from the provider, if known.
    picture_url: Option<String>,
    /// Random throwaway password. Never used for provider-backed login;
    /// it only satisfies the store's password requirement.
    password: String,
    /// When the user record was created.
    created_at: DateTime<Utc>,
    /// When the user record was last updated.
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user for a provider identity.
    ///
    /// When `email` is `None` the fallback address
    /// `"<uid>-line@example.com"` is used.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        uid: impl Into<String>,
        email: Option<String>,
        password: String,
    ) -> Self {
        let uid = uid.into();
        let email = email.unwrap_or_else(|| Self::fallback_email(&uid));
        let now = Utc::now();
        Self {
            id: UserId::new(),
            provider: provider.into(),
            uid,
            email,
            display_name: None,
            picture_url: None,
            password,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a user with all fields specified.
    ///
    /// Use this when reconstituting a user from storage.
    #[must_use]
    #[expect(clippy::too_many_arguments)]
    pub fn with_all_fields(
        id: UserId,
        provider: String,
        uid: String,
        email: String,
        display_name: Option<String>,
        picture_url: Option<String>,
        password: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            provider,
            uid,
            email,
            display_name,
            picture_url,
            password,
            created_at,
            updated_at,
        }
    }

    /// The synthetic email address used when the provider supplies none.
    #[must_use]
    pub fn fallback_email(uid: &str) -> String {
        format!("{uid}-line@example.com")
    }

    /// Returns the internal user ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the identity provider tag.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns the provider-issued subject identifier.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name, if known.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the profile picture URL, if known.
    #[must_use]
    pub fn picture_url(&self) -> Option<&str> {
        self.picture_url.as_deref()
    }

    /// Returns the stored throwaway password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns when the user was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the user was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the display name.
    pub fn set_display_name(&mut self, display_name: Option<String>) {
        self.display_name = display_name;
        self.updated_at = Utc::now();
    }

    /// Sets the profile picture URL.
    pub fn set_picture_url(&mut self, picture_url: Option<String>) {
        self.picture_url = picture_url;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_keeps_provided_email() {
        let user = User::new(
            PROVIDER_LINE,
            "U1234",
            Some("alice@example.com".to_string()),
            "pw".to_string(),
        );

        assert_eq!(user.provider(), "line");
        assert_eq!(user.uid(), "U1234");
        assert_eq!(user.email(), "alice@example.com");
    }

    #[test]
    fn missing_email_is_synthesized_from_uid() {
        let user = User::new(PROVIDER_LINE, "U1234", None, "pw".to_string());
        assert_eq!(user.email(), "U1234-line@example.com");
    }

    #[test]
    fn fallback_email_format() {
        assert_eq!(User::fallback_email("Uabc"), "Uabc-line@example.com");
    }

    #[test]
    fn new_user_has_no_optional_fields() {
        let user = User::new(PROVIDER_LINE, "U1", None, "pw".to_string());
        assert!(user.display_name().is_none());
        assert!(user.picture_url().is_none());
    }

    #[test]
    fn set_display_name_updates_timestamp() {
        let mut user = User::new(PROVIDER_LINE, "U1", None, "pw".to_string());
        let original_updated_at = user.updated_at();

        // Small delay to ensure timestamp changes
        std::thread::sleep(std::time::Duration::from_millis(1));
        user.set_display_name(Some("Alice".to_string()));

        assert_eq!(user.display_name(), Some("Alice"));
        assert!(user.updated_at() > original_updated_at);
    }

    #[test]
    fn with_all_fields_preserves_values() {
        let id = UserId::new();
        let created = Utc::now() - chrono::Duration::days(30);
        let updated = Utc::now() - chrono::Duration::days(1);

        let user = User::with_all_fields(
            id,
            "line".to_string(),
            "U99".to_string(),
            "u99@example.com".to_string(),
            Some("Alice".to_string()),
            Some("https://example.com/p.png".to_string()),
            "pw".to_string(),
            created,
            updated,
        );

        assert_eq!(user.id(), id);
        assert_eq!(user.uid(), "U99");
        assert_eq!(user.display_name(), Some("Alice"));
        assert_eq!(user.created_at(), created);
        assert_eq!(user.updated_at(), updated);
    }

    #[test]
    fn user_serialization_roundtrip() {
        let mut user = User::new(PROVIDER_LINE, "U5", None, "pw".to_string());
        user.set_picture_url(Some("https://example.com/p.png".to_string()));

        let json = serde_json::to_string(&user).expect("serialize");
        let parsed: User = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(user, parsed);
    }
}
