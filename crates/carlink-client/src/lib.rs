//! Client-side notification delivery and read-state reconciliation.
//!
//! This crate owns the push channel, the notification store, the badge
//! projection, and the optimistic backend sync used by Carlink UI shells.

pub mod api;
pub mod center;
pub mod channel;
pub mod error;
pub mod session;
pub mod store;
pub mod sync;

pub use api::HttpNotificationApi;
pub use center::NotificationCenter;
pub use channel::{PushChannel, PushSubscription};
pub use error::ClientError;
pub use session::{SessionState, SessionStore};
pub use store::NotificationStore;
pub use sync::{SyncAction, SyncCommand, SyncJournal, SyncStatus};
