use async_trait::async_trait;
use carlink_protocol::{
    ApiError, Credential, EventByteStream, NotificationApi, NotificationId, NotificationRecord,
    OwnerId,
};
use futures_util::stream;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// One recorded backend interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    FetchAll,
    FetchUnreadCount,
    MarkRead(NotificationId),
    MarkAllRead,
    Delete(NotificationId),
    OpenStream,
}

/// Recording stub for the backend notification service.
///
/// Configure canned responses and failure modes with the builder
/// methods, then inspect `calls` or await `wait_for_calls` to observe
/// fire-and-forget writes.
#[derive(Default)]
pub struct StubNotificationApi {
    records: Mutex<Vec<NotificationRecord>>,
    unread_count: Mutex<Option<usize>>,
    fetch_fails: Mutex<bool>,
    writes_fail: Mutex<bool>,
    connect_fails: Mutex<bool>,
    stream_chunks: Mutex<Vec<Vec<u8>>>,
    calls: Mutex<Vec<ApiCall>>,
    notify: Notify,
}

impl StubNotificationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, records: Vec<NotificationRecord>) -> Self {
        *self.records.lock() = records;
        self
    }

    pub fn with_unread_count(self, count: usize) -> Self {
        *self.unread_count.lock() = Some(count);
        self
    }

    /// Fail bulk fetches and unread-count reads.
    pub fn failing_fetch(self) -> Self {
        *self.fetch_fails.lock() = true;
        self
    }

    /// Fail mark-read, mark-all-read, and delete writes.
    pub fn failing_writes(self) -> Self {
        *self.writes_fail.lock() = true;
        self
    }

    /// Refuse to open the push stream.
    pub fn failing_connect(self) -> Self {
        *self.connect_fails.lock() = true;
        self
    }

    /// Script the chunks served by the push stream; the stream ends once
    /// they are exhausted.
    pub fn with_stream_chunks(self, chunks: Vec<Vec<u8>>) -> Self {
        *self.stream_chunks.lock() = chunks;
        self
    }

    /// Replace the canned bulk-fetch records after construction.
    pub fn set_records(&self, records: Vec<NotificationRecord>) {
        *self.records.lock() = records;
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Wait until at least `count` calls were recorded.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.calls.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn record_call(&self, call: ApiCall) {
        self.calls.lock().push(call);
        self.notify.notify_waiters();
    }
}

#[async_trait]
impl NotificationApi for StubNotificationApi {
    async fn fetch_all(&self, _owner: &OwnerId) -> Result<Vec<NotificationRecord>, ApiError> {
        self.record_call(ApiCall::FetchAll);
        if *self.fetch_fails.lock() {
            return Err(ApiError::Fetch("stub fetch failure".to_string()));
        }
        Ok(self.records.lock().clone())
    }

    async fn fetch_unread_count(&self, _owner: &OwnerId) -> Result<usize, ApiError> {
        self.record_call(ApiCall::FetchUnreadCount);
        match *self.unread_count.lock() {
            Some(count) => Ok(count),
            None => Err(ApiError::Fetch("stub unread count failure".to_string())),
        }
    }

    async fn mark_read(&self, _owner: &OwnerId, id: &NotificationId) -> Result<(), ApiError> {
        self.record_call(ApiCall::MarkRead(id.clone()));
        if *self.writes_fail.lock() {
            return Err(ApiError::Persistence("stub write failure".to_string()));
        }
        Ok(())
    }

    async fn mark_all_read(&self, _owner: &OwnerId) -> Result<(), ApiError> {
        self.record_call(ApiCall::MarkAllRead);
        if *self.writes_fail.lock() {
            return Err(ApiError::Persistence("stub write failure".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, _owner: &OwnerId, id: &NotificationId) -> Result<(), ApiError> {
        self.record_call(ApiCall::Delete(id.clone()));
        if *self.writes_fail.lock() {
            return Err(ApiError::Persistence("stub write failure".to_string()));
        }
        Ok(())
    }

    async fn open_stream(&self, _credential: &Credential) -> Result<EventByteStream, ApiError> {
        self.record_call(ApiCall::OpenStream);
        if *self.connect_fails.lock() {
            return Err(ApiError::Connection("stub connection refused".to_string()));
        }
        let chunks: Vec<Result<Vec<u8>, ApiError>> =
            self.stream_chunks.lock().drain(..).map(Ok).collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}
