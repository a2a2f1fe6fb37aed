//! Upstream endpoints and worker-pool sizing.

use std::time::Duration;

/// Default per-call timeout for every upstream.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Base URL and timeout of one upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub base_url: String,
    pub timeout: Duration,
}

impl ServiceEndpoint {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Joins `path` onto the base URL, tolerating a trailing slash.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Settings for the three upstream clients and their shared worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub product: ServiceEndpoint,
    pub recommendation: ServiceEndpoint,
    pub review: ServiceEndpoint,
    /// Maximum number of upstream calls in flight.
    pub pool_size: usize,
    /// Calls allowed to wait for a worker before new ones are rejected.
    pub queue_depth: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            product: ServiceEndpoint::new("http://product:8080", DEFAULT_TIMEOUT),
            recommendation: ServiceEndpoint::new("http://recommendation:8080", DEFAULT_TIMEOUT),
            review: ServiceEndpoint::new("http://review:8080", DEFAULT_TIMEOUT),
            pool_size: 10,
            queue_depth: 100,
        }
    }
}
