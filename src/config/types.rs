//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the polling dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Collector root URL; endpoint paths are joined onto it.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Milliseconds between cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// HTML file rewritten after every region update.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Per-request timeout. Unset means the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000/".to_string()
}

fn default_interval_ms() -> u64 {
    2000
}

impl PollerConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Page reload period, rounded up to whole seconds.
    #[must_use]
    pub fn refresh_secs(&self) -> u64 {
        self.interval_ms.div_ceil(1000).max(1)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            interval_ms: default_interval_ms(),
            output: None,
            request_timeout_secs: None,
        }
    }
}

/// Settings for the event collector server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Events kept in memory; the oldest are dropped beyond this.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// Events returned by `GET /api/events` without a `limit` parameter.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Whether to enable permissive CORS.
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_events() -> usize {
    1000
}

fn default_limit() -> usize {
    100
}

fn default_cors_permissive() -> bool {
    true
}

impl CollectorConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_events: default_max_events(),
            default_limit: default_limit(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArpguardConfig {
    pub poller: PollerConfig,
    pub collector: CollectorConfig,
}
