//! Public SDK surface for the Carlink notification client.
//!
//! Consumers normally depend on this crate alone: it re-exports the
//! client, config, and protocol crates under stable module names.

/// Notification center, store, channel, and session types.
pub use carlink_client as client;
/// Client configuration schema and loading.
pub use carlink_config as config;
/// Wire types and the backend interface.
pub use carlink_protocol as protocol;

#[inline]
/// Initialize logging via env_logger when the "logging" feature is on.
///
/// Without the feature this is a no-op; binaries should still call it
/// early in startup so log output is wired up when available.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
