//! Wire protocol types for Carlink notifications and the push channel.

mod api;
mod sse;

pub use api::{ApiError, EventByteStream, NotificationApi};
pub use sse::SseDecoder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Opaque backend-assigned notification identifier.
pub type NotificationId = String;
/// Identifier of the recipient user.
pub type OwnerId = String;
/// Session-scoped bearer credential presented to the backend.
pub type Credential = String;

/// A single discrete alert delivered to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRecord {
    /// Backend-assigned unique identifier.
    pub id: NotificationId,
    /// Notification category.
    pub category: NotificationCategory,
    /// Display title.
    pub title: String,
    /// Display body.
    pub body: String,
    /// Read flag; push events omit it and it defaults to unread.
    #[serde(default)]
    pub read: bool,
    /// Creation timestamp, immutable after receipt.
    pub created_at: DateTime<Utc>,
    /// Recipient user id.
    pub owner_id: OwnerId,
}

/// Closed set of notification categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Estimate or quote activity.
    Estimate,
    /// Direct message activity.
    Message,
    /// Review activity.
    Review,
    /// System announcement.
    System,
}

impl NotificationCategory {
    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Estimate => "estimate",
            NotificationCategory::Message => "message",
            NotificationCategory::Review => "review",
            NotificationCategory::System => "system",
        }
    }

    /// Parse a category from a lowercase string, defaulting to `System`.
    pub fn parse(value: &str) -> Self {
        match value {
            "estimate" => NotificationCategory::Estimate,
            "message" => NotificationCategory::Message,
            "review" => NotificationCategory::Review,
            _ => NotificationCategory::System,
        }
    }
}

impl FromStr for NotificationCategory {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(NotificationCategory::parse(value))
    }
}

/// One decoded push-channel event.
///
/// The channel delivers exactly one frame per SSE event; there is no
/// batching contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum PushFrame {
    /// A freshly created notification for the subscribed user.
    Notification { record: NotificationRecord },
    /// Transport keep-alive; carries no state.
    Ping,
}

impl PushFrame {
    /// Decode a frame from one SSE data payload.
    pub fn decode(payload: &str) -> Result<Self, ProtocolError> {
        if payload.trim().is_empty() {
            return Err(ProtocolError::EmptyPayload);
        }
        Ok(serde_json::from_str(payload)?)
    }
}

/// Response body for the bulk notification fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationListResponse {
    /// All notifications for the requesting user.
    pub notifications: Vec<NotificationRecord>,
}

/// Response body for the unread-count fallback endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnreadCountResponse {
    /// Count of unread notifications for the requesting user.
    pub unread: usize,
}

/// Sink interface between the push channel and the notification store.
pub trait NotificationSink: Send + Sync {
    /// Deliver one record to downstream state.
    fn deliver(&self, record: NotificationRecord);
}

/// Errors returned while decoding push-channel payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Event payload was not valid frame JSON.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
    /// Event carried no data payload.
    #[error("empty event payload")]
    EmptyPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(id: &str) -> NotificationRecord {
        NotificationRecord {
            id: id.to_string(),
            category: NotificationCategory::Estimate,
            title: "New estimate".to_string(),
            body: "Your quote request received an estimate".to_string(),
            read: false,
            created_at: Utc::now(),
            owner_id: "owner-1".to_string(),
        }
    }

    #[test]
    fn category_parses_and_formats() {
        assert_eq!(
            NotificationCategory::parse("estimate"),
            NotificationCategory::Estimate
        );
        assert_eq!(
            NotificationCategory::parse("review"),
            NotificationCategory::Review
        );
        assert_eq!(
            NotificationCategory::parse("unknown"),
            NotificationCategory::System
        );
        assert_eq!(NotificationCategory::Message.as_str(), "message");
    }

    #[test]
    fn record_defaults_to_unread_on_the_wire() {
        let decoded: NotificationRecord = serde_json::from_value(json!({
            "id": "n-1",
            "category": "message",
            "title": "New message",
            "body": "A center replied to your inquiry",
            "created_at": "2026-03-01T09:30:00Z",
            "owner_id": "owner-1",
        }))
        .expect("deserialize");
        assert_eq!(decoded.read, false);
        assert_eq!(decoded.category, NotificationCategory::Message);
    }

    #[test]
    fn push_frame_round_trips_through_json() {
        let frame = PushFrame::Notification {
            record: record("n-7"),
        };
        let encoded = serde_json::to_string(&frame).expect("serialize");
        let decoded = PushFrame::decode(&encoded).expect("decode");
        assert_eq!(decoded, frame);
    }

    #[test]
    fn push_frame_decode_rejects_empty_and_malformed_payloads() {
        assert!(matches!(
            PushFrame::decode("  "),
            Err(ProtocolError::EmptyPayload)
        ));
        assert!(matches!(
            PushFrame::decode("{not json"),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn ping_frame_uses_snake_case_tag() {
        let encoded = serde_json::to_value(PushFrame::Ping).expect("serialize");
        assert_eq!(encoded, json!({ "type": "ping" }));
    }
}
