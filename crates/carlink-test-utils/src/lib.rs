//! Test helpers shared across Carlink crates.

pub mod api;
pub mod records;

pub use api::{ApiCall, StubNotificationApi};
pub use records::{notification, sse_event};
