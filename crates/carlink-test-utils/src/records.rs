use carlink_protocol::{NotificationCategory, NotificationRecord, PushFrame};
use chrono::{Duration, Utc};

/// Build an unread notification created the given number of minutes ago.
pub fn notification(id: &str, owner: &str, minutes_ago: i64) -> NotificationRecord {
    NotificationRecord {
        id: id.to_string(),
        category: NotificationCategory::Estimate,
        title: format!("notification {id}"),
        body: "body".to_string(),
        read: false,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
        owner_id: owner.to_string(),
    }
}

/// Encode a push frame as one complete SSE event.
pub fn sse_event(frame: &PushFrame) -> Vec<u8> {
    let payload = serde_json::to_string(frame).expect("serialize frame");
    format!("data: {payload}\n\n").into_bytes()
}
