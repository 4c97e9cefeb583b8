// SPDX-License-Identifier: Apache-2.0
//! The recognized configuration options (spec.md §6) and their defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration recognized by the system. Every field has a
/// documented default so a freshly constructed `FactumConfig` is usable
/// local-only with no remote peer configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactumConfig {
    /// Base URL of the remote peer for the `save` endpoint. Absence means
    /// local-only mode: facts are persisted but never transmitted.
    #[serde(default)]
    pub http_endpoint: Option<String>,
    /// Optional streaming endpoint for the graph-stream subscription
    /// transport. Absence falls back to periodic polling at
    /// `feed_refresh_interval_seconds`.
    #[serde(default)]
    pub ws_endpoint: Option<String>,
    /// Handle identifying a durable store instance. Absence means an
    /// in-memory store, which does not survive process restart.
    #[serde(default)]
    pub local_store: Option<String>,
    /// Per-request timeout for transport calls, in seconds.
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
    /// Coalescing delay for the outbound saver, in milliseconds.
    #[serde(default = "default_queue_processing_delay_ms")]
    pub queue_processing_delay_ms: u64,
    /// Fallback periodic refresh interval when streaming is unavailable,
    /// in seconds.
    #[serde(default = "default_feed_refresh_interval_seconds")]
    pub feed_refresh_interval_seconds: u64,
}

impl Default for FactumConfig {
    fn default() -> Self {
        Self {
            http_endpoint: None,
            ws_endpoint: None,
            local_store: None,
            http_timeout_seconds: default_http_timeout_seconds(),
            queue_processing_delay_ms: default_queue_processing_delay_ms(),
            feed_refresh_interval_seconds: default_feed_refresh_interval_seconds(),
        }
    }
}

fn default_http_timeout_seconds() -> u64 {
    30
}

fn default_queue_processing_delay_ms() -> u64 {
    100
}

fn default_feed_refresh_interval_seconds() -> u64 {
    90
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = FactumConfig::default();
        assert_eq!(config.http_timeout_seconds, 30);
        assert_eq!(config.queue_processing_delay_ms, 100);
        assert_eq!(config.feed_refresh_interval_seconds, 90);
        assert_eq!(config.http_endpoint, None);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults_on_deserialize() {
        let config: FactumConfig = serde_json::from_str(r#"{"httpEndpoint":"https://example.test"}"#).unwrap();
        assert_eq!(config.http_endpoint, Some("https://example.test".to_string()));
        assert_eq!(config.http_timeout_seconds, 30);
    }

    #[test]
    fn round_trips_through_json() {
        let config = FactumConfig { http_endpoint: Some("https://a".into()), ..FactumConfig::default() };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: FactumConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
