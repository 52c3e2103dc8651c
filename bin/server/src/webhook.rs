//! Messaging API webhook route.
//!
//! LINE delivers event batches here. The signature gate runs before
//! anything else: an invalid or missing `X-Line-Signature` is answered
//! with 400 and no event is processed. After a valid batch the response
//! is always 200, whatever happened to individual events.
//!
//! CSRF protection does not apply to this endpoint; the caller is the
//! provider, not a browser, and the HMAC signature is the authentication.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use line_bridge_line::{MessageContent, MessagingApi, MessagingClient, OutgoingMessage, WebhookEvent};
use line_bridge_platform_access::{PROVIDER_LINE, UserStore, store};
use std::sync::Arc;

use crate::auth::{AppState, db::UserRepository};

/// Header carrying the webhook signature.
const SIGNATURE_HEADER: &str = "x-line-signature";

/// Reply sent for follow events.
const FOLLOW_REPLY_TEXT: &str = "Starting follow";

/// Handles a webhook delivery from the Messaging API.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !verify_request(&state.messaging, &headers, &body) {
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    }

    let events = match state.messaging.parse_events(&body) {
        Ok(events) => events,
        Err(error) => {
            tracing::error!(%error, "failed to parse webhook body");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    let user_repo = UserRepository::new(state.db_pool.clone());
    process_events(&user_repo, state.messaging.as_ref(), events).await;

    StatusCode::OK.into_response()
}

/// Checks the signature header against the raw body.
fn verify_request(messaging: &MessagingClient, headers: &HeaderMap, body: &[u8]) -> bool {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("webhook delivery without signature header");
        return false;
    };

    let valid = messaging.validate_signature(body, signature);
    if !valid {
        tracing::warn!("webhook delivery with invalid signature");
    }
    valid
}

/// Dispatches a batch of events.
///
/// Per-event failures (store or reply errors) are logged and never stop
/// the rest of the batch.
async fn process_events(
    users: &dyn UserStore,
    messaging: &dyn MessagingApi,
    events: Vec<WebhookEvent>,
) {
    for event in events {
        match event {
            WebhookEvent::Message {
                reply_token,
                source,
                message: MessageContent::Text { text },
            } => {
                handle_text_message(users, messaging, &reply_token, source.user_id.as_deref(), &text)
                    .await;
            }
            WebhookEvent::Message { .. } => {
                tracing::debug!("ignoring unhandled message subtype");
            }
            WebhookEvent::Follow { reply_token, source } => {
                handle_follow(users, messaging, &reply_token, source.user_id.as_deref()).await;
            }
            WebhookEvent::Unfollow { .. } => {
                tracing::debug!("ignoring unfollow event");
            }
            WebhookEvent::Other => {
                tracing::debug!("ignoring unhandled event type");
            }
        }
    }
}

/// Replies to a text message, echoing the text and the sender's name.
///
/// A sender without a local user record is created on the spot, the
/// same way a follow event would create one; the reply then falls back
/// to the uid where no display name is known.
async fn handle_text_message(
    users: &dyn UserStore,
    messaging: &dyn MessagingApi,
    reply_token: &str,
    user_id: Option<&str>,
    text: &str,
) {
    let Some(uid) = user_id else {
        tracing::warn!("message event without a user id; skipping reply");
        return;
    };

    let user = match store::find_or_create(users, PROVIDER_LINE, uid, None, None, None).await {
        Ok(user) => user,
        Err(error) => {
            tracing::error!(%error, uid, "failed to look up user for message event");
            return;
        }
    };

    let name = user.display_name().unwrap_or_else(|| user.uid());
    let reply = OutgoingMessage::text(format!("Received message: {text} from user: {name}"));

    if let Err(error) = messaging.reply_message(reply_token, reply).await {
        tracing::error!(%error, uid, "failed to reply to message event");
    }
}

/// Greets a new follower, creating their user record if absent.
async fn handle_follow(
    users: &dyn UserStore,
    messaging: &dyn MessagingApi,
    reply_token: &str,
    user_id: Option<&str>,
) {
    let Some(uid) = user_id else {
        tracing::warn!("follow event without a user id; skipping reply");
        return;
    };

    if let Err(error) = store::find_or_create(users, PROVIDER_LINE, uid, None, None, None).await {
        tracing::error!(%error, uid, "failed to create user for follow event");
        return;
    }

    let reply = OutgoingMessage::text(FOLLOW_REPLY_TEXT);
    if let Err(error) = messaging.reply_message(reply_token, reply).await {
        tracing::error!(%error, uid, "failed to reply to follow event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use base64::Engine;
    use hmac::{Hmac, Mac};
    use line_bridge_line::{EventSource, LineApiError};
    use line_bridge_platform_access::{StoreError, User};
    use sha2::Sha256;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryUsers {
        users: Mutex<Vec<User>>,
    }

    impl InMemoryUsers {
        fn seed(&self, uid: &str, display_name: Option<&str>) {
            let mut user = User::new(PROVIDER_LINE, uid, None, "pw".to_string());
            user.set_display_name(display_name.map(str::to_string));
            self.users.lock().expect("lock").push(user);
        }

        fn count(&self) -> usize {
            self.users.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUsers {
        async fn find_by_provider_uid(
            &self,
            provider: &str,
            uid: &str,
        ) -> line_bridge_core::Result<Option<User>, StoreError> {
            let users = self.users.lock().expect("lock");
            Ok(users
                .iter()
                .find(|u| u.provider() == provider && u.uid() == uid)
                .cloned())
        }

        async fn create(&self, user: &User) -> line_bridge_core::Result<(), StoreError> {
            self.users.lock().expect("lock").push(user.clone());
            Ok(())
        }
    }

    /// Records outbound calls instead of hitting the network.
    #[derive(Default)]
    struct RecordingMessaging {
        pushes: Mutex<Vec<(String, OutgoingMessage)>>,
        replies: Mutex<Vec<(String, OutgoingMessage)>>,
    }

    impl RecordingMessaging {
        fn pushes(&self) -> Vec<(String, OutgoingMessage)> {
            self.pushes.lock().expect("lock").clone()
        }

        fn replies(&self) -> Vec<(String, OutgoingMessage)> {
            self.replies.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl MessagingApi for RecordingMessaging {
        async fn push_message(
            &self,
            to: &str,
            message: OutgoingMessage,
        ) -> Result<(), LineApiError> {
            self.pushes
                .lock()
                .expect("lock")
                .push((to.to_string(), message));
            Ok(())
        }

        async fn reply_message(
            &self,
            reply_token: &str,
            message: OutgoingMessage,
        ) -> Result<(), LineApiError> {
            self.replies
                .lock()
                .expect("lock")
                .push((reply_token.to_string(), message));
            Ok(())
        }
    }

    fn user_source(uid: &str) -> EventSource {
        EventSource {
            kind: Some("user".to_string()),
            user_id: Some(uid.to_string()),
        }
    }

    fn text_event(reply_token: &str, uid: &str, text: &str) -> WebhookEvent {
        WebhookEvent::Message {
            reply_token: reply_token.to_string(),
            source: user_source(uid),
            message: MessageContent::Text {
                text: text.to_string(),
            },
        }
    }

    fn follow_event(reply_token: &str, uid: &str) -> WebhookEvent {
        WebhookEvent::Follow {
            reply_token: reply_token.to_string(),
            source: user_source(uid),
        }
    }

    #[tokio::test]
    async fn text_message_from_known_user_gets_echoed_reply() {
        let users = InMemoryUsers::default();
        users.seed("U1", Some("Alice"));
        let messaging = RecordingMessaging::default();

        process_events(&users, &messaging, vec![text_event("rt-1", "U1", "hello")]).await;

        let replies = messaging.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "rt-1");
        assert_eq!(
            replies[0].1,
            OutgoingMessage::text("Received message: hello from user: Alice")
        );
        // Inbound events never trigger a push, only replies.
        assert!(messaging.pushes().is_empty());
    }

    #[tokio::test]
    async fn text_message_from_unknown_user_creates_user_and_falls_back_to_uid() {
        let users = InMemoryUsers::default();
        let messaging = RecordingMessaging::default();

        process_events(&users, &messaging, vec![text_event("rt-2", "U7", "hi")]).await;

        assert_eq!(users.count(), 1);
        let replies = messaging.replies();
        assert_eq!(
            replies[0].1,
            OutgoingMessage::text("Received message: hi from user: U7")
        );
    }

    #[tokio::test]
    async fn follow_from_unseen_uid_creates_user_with_synthesized_email() {
        let users = InMemoryUsers::default();
        let messaging = RecordingMessaging::default();

        process_events(&users, &messaging, vec![follow_event("rt-3", "U42")]).await;

        assert_eq!(users.count(), 1);
        {
            let stored = users.users.lock().expect("lock");
            assert_eq!(stored[0].email(), "U42-line@example.com");
        }

        let replies = messaging.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "rt-3");
        assert_eq!(replies[0].1, OutgoingMessage::text("Starting follow"));
    }

    #[tokio::test]
    async fn duplicate_follow_delivery_creates_single_user() {
        let users = InMemoryUsers::default();
        let messaging = RecordingMessaging::default();

        process_events(&users, &messaging, vec![follow_event("rt-4", "U42")]).await;
        process_events(&users, &messaging, vec![follow_event("rt-5", "U42")]).await;

        assert_eq!(users.count(), 1);
        assert_eq!(messaging.replies().len(), 2);
    }

    #[tokio::test]
    async fn unhandled_events_are_ignored() {
        let users = InMemoryUsers::default();
        let messaging = RecordingMessaging::default();

        let events = vec![
            WebhookEvent::Other,
            WebhookEvent::Unfollow {
                source: user_source("U9"),
            },
            WebhookEvent::Message {
                reply_token: "rt-6".to_string(),
                source: user_source("U9"),
                message: MessageContent::Other,
            },
        ];
        process_events(&users, &messaging, events).await;

        assert_eq!(users.count(), 0);
        assert!(messaging.replies().is_empty());
    }

    #[tokio::test]
    async fn message_event_without_user_id_is_skipped() {
        let users = InMemoryUsers::default();
        let messaging = RecordingMessaging::default();

        let events = vec![WebhookEvent::Message {
            reply_token: "rt-7".to_string(),
            source: EventSource {
                kind: Some("group".to_string()),
                user_id: None,
            },
            message: MessageContent::Text {
                text: "hi".to_string(),
            },
        }];
        process_events(&users, &messaging, events).await;

        assert_eq!(users.count(), 0);
        assert!(messaging.replies().is_empty());
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("key");
        mac.update(body);
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn requests_without_signature_header_are_rejected() {
        let messaging =
            MessagingClient::new("secret".to_string(), "token".to_string()).expect("client");
        let headers = HeaderMap::new();

        assert!(!verify_request(&messaging, &headers, b"{}"));
    }

    #[test]
    fn requests_with_invalid_signature_are_rejected() {
        let messaging =
            MessagingClient::new("secret".to_string(), "token".to_string()).expect("client");
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&sign("wrong-secret", b"{}")).expect("header"),
        );

        assert!(!verify_request(&messaging, &headers, b"{}"));
    }

    #[test]
    fn requests_with_valid_signature_pass_the_gate() {
        let messaging =
            MessagingClient::new("secret".to_string(), "token".to_string()).expect("client");
        let body = br#"{"events": []}"#;
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&sign("secret", body)).expect("header"),
        );

        assert!(verify_request(&messaging, &headers, body));
    }
}
