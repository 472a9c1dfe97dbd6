//! Configuration schema for the Carlink client.

use serde::{Deserialize, Serialize};

/// Root config for the Carlink notification client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for assembling a `ClientConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Replace the backend endpoint configuration.
    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.config.backend = backend;
        self
    }

    /// Replace the push channel configuration.
    pub fn channel(mut self, channel: ChannelConfig) -> Self {
        self.config.channel = channel;
        self
    }

    /// Replace the session persistence configuration.
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Finalize and return the built `ClientConfig`.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Backend notification service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    /// Base URL of the notification service, e.g. `https://api.carlink.app`.
    #[serde(default)]
    pub base_url: String,
    /// Per-request timeout for request/response calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Push channel transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Stream endpoint path relative to the backend base URL.
    #[serde(default = "default_stream_endpoint")]
    pub endpoint: String,
    /// Delivery queue depth between the pump task and the consumer.
    #[serde(default = "default_channel_buffer")]
    pub buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_stream_endpoint(),
            buffer: default_channel_buffer(),
        }
    }
}

fn default_stream_endpoint() -> String {
    "/api/notifications/stream".to_string()
}

fn default_channel_buffer() -> usize {
    64
}

/// Session snapshot persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Path of the persisted session snapshot; `None` disables hydration.
    #[serde(default)]
    pub cache_path: Option<String>,
}
