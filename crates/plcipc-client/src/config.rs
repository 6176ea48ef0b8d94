//! Client configuration
//!
//! Connection settings for one IPC client. The config doubles as the
//! identity key of the shared-client registry, so it derives `Eq` and
//! `Hash`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for an IPC client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Path of the request socket (client -> runtime)
    pub request_path: String,
    /// Path of the response socket (runtime -> client)
    pub response_path: String,
    /// Poll interval for the transport's background processing and the
    /// subscription scheduler, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Default timeout for synchronous type-class resolution, in
    /// milliseconds
    #[serde(default = "default_type_query_timeout_ms")]
    pub type_query_timeout_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_type_query_timeout_ms() -> u64 {
    1000
}

impl ClientConfig {
    /// Create a config with default timings.
    pub fn new(request_path: impl Into<String>, response_path: impl Into<String>) -> Self {
        Self {
            request_path: request_path.into(),
            response_path: response_path.into(),
            poll_interval_ms: default_poll_interval_ms(),
            type_query_timeout_ms: default_type_query_timeout_ms(),
        }
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_type_query_timeout_ms(mut self, type_query_timeout_ms: u64) -> Self {
        self.type_query_timeout_ms = type_query_timeout_ms;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn type_query_timeout(&self) -> Duration {
        Duration::from_millis(self.type_query_timeout_ms)
    }
}
