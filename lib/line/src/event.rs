//! Webhook event model.
//!
//! The Messaging API delivers a JSON batch of events per webhook call.
//! Events are decoded into a tagged enum with explicit variants for the
//! types this service handles; unknown event and message types decode to
//! catch-all variants so new provider features never fail the batch.

use serde::Deserialize;

use crate::error::LineApiError;

/// The full webhook request body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    /// Bot user ID the events were sent to.
    #[serde(default)]
    pub destination: Option<String>,
    /// Ordered batch of events.
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// A single webhook event, dispatched by its `type` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    /// A user sent a message to the bot.
    Message {
        /// One-time token for the correlated reply.
        #[serde(rename = "replyToken")]
        reply_token: String,
        /// Who sent the event.
        source: EventSource,
        /// The message payload.
        message: MessageContent,
    },
    /// A user added the bot as a friend.
    Follow {
        #[serde(rename = "replyToken")]
        reply_token: String,
        source: EventSource,
    },
    /// A user blocked the bot. No reply token is issued.
    Unfollow { source: EventSource },
    /// Any event type this service does not handle.
    #[serde(other)]
    Other,
}

/// The sender of a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSource {
    /// Source kind ("user", "group", "room").
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Sending user's provider ID. Absent for some group/room sources.
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// Message payload within a message event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    /// A plain text message.
    Text { text: String },
    /// Any message subtype this service does not handle
    /// (image, sticker, video, …).
    #[serde(other)]
    Other,
}

/// Parses a raw webhook body into its event batch.
pub fn parse_events(body: &[u8]) -> Result<Vec<WebhookEvent>, LineApiError> {
    let request: WebhookRequest =
        serde_json::from_slice(body).map_err(|e| LineApiError::Decode {
            reason: e.to_string(),
        })?;
    Ok(request.events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_message_event() {
        let body = br#"{
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "replyToken": "rt-1",
                "source": {"type": "user", "userId": "U1234"},
                "message": {"type": "text", "id": "325708", "text": "hello"}
            }]
        }"#;

        let events = parse_events(body).expect("parse");
        assert_eq!(events.len(), 1);
        match &events[0] {
            WebhookEvent::Message {
                reply_token,
                source,
                message: MessageContent::Text { text },
            } => {
                assert_eq!(reply_token, "rt-1");
                assert_eq!(source.user_id.as_deref(), Some("U1234"));
                assert_eq!(text, "hello");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn parses_follow_event() {
        let body = br#"{
            "events": [{
                "type": "follow",
                "replyToken": "rt-2",
                "source": {"type": "user", "userId": "U9"}
            }]
        }"#;

        let events = parse_events(body).expect("parse");
        assert!(matches!(events[0], WebhookEvent::Follow { .. }));
    }

    #[test]
    fn unknown_event_type_maps_to_other() {
        let body = br#"{
            "events": [{"type": "beacon", "replyToken": "rt-3", "source": {"type": "user", "userId": "U9"}}]
        }"#;

        let events = parse_events(body).expect("parse");
        assert!(matches!(events[0], WebhookEvent::Other));
    }

    #[test]
    fn unknown_message_subtype_maps_to_other_content() {
        let body = br#"{
            "events": [{
                "type": "message",
                "replyToken": "rt-4",
                "source": {"type": "user", "userId": "U9"},
                "message": {"type": "sticker", "packageId": "1", "stickerId": "2"}
            }]
        }"#;

        let events = parse_events(body).expect("parse");
        match &events[0] {
            WebhookEvent::Message { message, .. } => {
                assert!(matches!(message, MessageContent::Other));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn empty_batch_is_ok() {
        let events = parse_events(br#"{"events": []}"#).expect("parse");
        assert!(events.is_empty());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = parse_events(b"not json").expect_err("should fail");
        assert!(matches!(err, LineApiError::Decode { .. }));
    }

    #[test]
    fn source_without_user_id_parses() {
        let body = br#"{
            "events": [{
                "type": "message",
                "replyToken": "rt-5",
                "source": {"type": "group", "groupId": "G1"},
                "message": {"type": "text", "text": "hi"}
            }]
        }"#;

        let events = parse_events(body).expect("parse");
        match &events[0] {
            WebhookEvent::Message { source, .. } => assert!(source.user_id.is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
