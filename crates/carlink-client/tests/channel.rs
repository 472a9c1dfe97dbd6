//! Push channel integration tests over scripted SSE streams.

use carlink_client::{ClientError, NotificationStore, PushChannel};
use carlink_protocol::{ApiError, NotificationApi, PushFrame};
use carlink_test_utils::{StubNotificationApi, notification, sse_event};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn frame(id: &str, minutes_ago: i64) -> Vec<u8> {
    sse_event(&PushFrame::Notification {
        record: notification(id, "owner-1", minutes_ago),
    })
}

async fn subscribe(stub: StubNotificationApi) -> Result<PushChannel, ClientError> {
    let api: Arc<dyn NotificationApi> = Arc::new(stub);
    let credential = "token".to_string();
    PushChannel::subscribe(api, &credential, 8).await
}

#[tokio::test]
async fn delivers_records_and_forces_unread() {
    let mut record = notification("a", "owner-1", 1);
    record.read = true;
    let stub = StubNotificationApi::new()
        .with_stream_chunks(vec![sse_event(&PushFrame::Notification { record })]);

    let mut channel = subscribe(stub).await.expect("subscribe");
    let delivered = channel.recv().await.expect("record");
    assert_eq!(delivered.id, "a".to_string());
    // Whatever the backend serialized, delivery means unread.
    assert_eq!(delivered.read, false);
    assert_eq!(channel.recv().await, None);
}

#[tokio::test]
async fn skips_pings_and_malformed_frames() {
    let stub = StubNotificationApi::new().with_stream_chunks(vec![
        sse_event(&PushFrame::Ping),
        b"data: {broken\n\n".to_vec(),
        frame("a", 1),
    ]);

    let mut channel = subscribe(stub).await.expect("subscribe");
    let delivered = channel.recv().await.expect("record");
    assert_eq!(delivered.id, "a".to_string());
    assert_eq!(channel.recv().await, None);
}

#[tokio::test]
async fn reassembles_events_split_across_chunks() {
    let event = frame("a", 1);
    let (head, tail) = event.split_at(7);
    let stub =
        StubNotificationApi::new().with_stream_chunks(vec![head.to_vec(), tail.to_vec()]);

    let mut channel = subscribe(stub).await.expect("subscribe");
    let delivered = channel.recv().await.expect("record");
    assert_eq!(delivered.id, "a".to_string());
}

#[tokio::test]
async fn close_is_idempotent_and_stops_delivery() {
    let stub =
        StubNotificationApi::new().with_stream_chunks(vec![frame("a", 2), frame("b", 1)]);

    let mut channel = subscribe(stub).await.expect("subscribe");
    channel.close();
    channel.close();
    assert!(channel.is_closed());
    assert_eq!(channel.recv().await, None);
}

#[tokio::test]
async fn refused_connection_surfaces_to_the_caller() {
    let err = subscribe(StubNotificationApi::new().failing_connect())
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        ClientError::Api(ApiError::Connection(_))
    ));
}

#[tokio::test]
async fn forwarded_records_keep_arrival_order_in_the_store() {
    // The newer record arrives first: the prepend rule preserves arrival
    // order, so the older record ends up displayed first. Documented
    // limitation, not a re-sort bug.
    let stub = StubNotificationApi::new()
        .with_stream_chunks(vec![frame("newer", 5), frame("older", 60)]);

    let channel = subscribe(stub).await.expect("subscribe");
    let store = NotificationStore::new();
    let mut subscription = channel.forward(Arc::new(store.clone()));

    tokio::time::timeout(Duration::from_secs(1), async {
        while store.snapshot().len() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("records forwarded");

    let ids: Vec<_> = store
        .snapshot()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec!["older".to_string(), "newer".to_string()]);
    assert_eq!(store.unread_count(), 2);

    subscription.close();
    subscription.close();
    assert!(subscription.is_closed());
}
