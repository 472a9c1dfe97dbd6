//! Error types for the notification client crate.

use carlink_protocol::{ApiError, ProtocolError};
use thiserror::Error;

/// Errors returned by notification client operations.
///
/// Nothing here is fatal to a consuming application: the notification
/// center recovers every variant locally (logged, or substituted with
/// fallback state).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend request or push stream failure.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Push payload could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// Session snapshot could not be read or written.
    #[error("session error: {0}")]
    Session(String),
    /// The push channel is closed; no further events will be delivered.
    #[error("push channel closed")]
    Closed,
}
