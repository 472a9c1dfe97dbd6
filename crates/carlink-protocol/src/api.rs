//! Backend interface surface consumed by the notification client.

use crate::{Credential, NotificationId, NotificationRecord, OwnerId};
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

/// Raw byte stream carrying the SSE body of the push channel.
pub type EventByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ApiError>> + Send>>;

/// Errors returned by the backend notification service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The push channel could not be established or was dropped.
    #[error("connection error: {0}")]
    Connection(String),
    /// A backend write (mark-read, delete) failed.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// A backend read (bulk fetch, unread count) failed.
    #[error("fetch error: {0}")]
    Fetch(String),
}

/// Request/response and push surface of the backend notification service.
///
/// Writes are dispatched fire-and-forget by the client; implementations
/// must not assume the caller awaits them before mutating local state.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Fetch all notifications for the given user.
    async fn fetch_all(&self, owner: &OwnerId) -> Result<Vec<NotificationRecord>, ApiError>;

    /// Fetch the unread count used to seed the badge before the store is populated.
    async fn fetch_unread_count(&self, owner: &OwnerId) -> Result<usize, ApiError>;

    /// Persist a single read-state transition.
    async fn mark_read(&self, owner: &OwnerId, id: &NotificationId) -> Result<(), ApiError>;

    /// Persist a bulk read-state transition.
    async fn mark_all_read(&self, owner: &OwnerId) -> Result<(), ApiError>;

    /// Persist the removal of one notification.
    async fn delete(&self, owner: &OwnerId, id: &NotificationId) -> Result<(), ApiError>;

    /// Open the session-scoped push stream.
    async fn open_stream(&self, credential: &Credential) -> Result<EventByteStream, ApiError>;
}
