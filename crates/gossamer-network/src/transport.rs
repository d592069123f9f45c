//! # Transport Settings
//!
//! HTTP/2 tuning applied to every gRPC channel a `GrpcConnector` opens.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// gRPC channel configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Time allowed to establish the TCP/HTTP2 connection (ms)
    pub connect_timeout_ms: u64,

    /// Per-request deadline (ms); 0 disables it
    pub request_timeout_ms: u64,

    /// Disable Nagle's algorithm
    pub tcp_nodelay: bool,

    /// HTTP/2 keepalive ping interval (ms); 0 disables it
    pub keepalive_interval_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            tcp_nodelay: true,
            keepalive_interval_ms: 0,
        }
    }
}

impl TransportConfig {
    /// Connection establishment timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Request deadline, if enabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    /// Keepalive interval, if enabled
    pub fn keepalive_interval(&self) -> Option<Duration> {
        (self.keepalive_interval_ms > 0).then(|| Duration::from_millis(self.keepalive_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_defaults() {
        let config = TransportConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.keepalive_interval(), None);
    }

    #[test]
    fn test_zero_disables_timeouts() {
        let config = TransportConfig {
            request_timeout_ms: 0,
            keepalive_interval_ms: 5_000,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.keepalive_interval(), Some(Duration::from_secs(5)));
    }
}
