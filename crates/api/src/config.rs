//! Application configuration loaded from environment variables.

use std::time::Duration;

use composite::{ServiceEndpoint, UpstreamConfig};

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `7000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `json` for JSON lines, anything else for text
/// - `SERVICE_ADDRESS`: reported in every aggregate (default: `"<HOSTNAME>:<port>"`)
/// - `PRODUCT_SERVICE_URL`, `RECOMMENDATION_SERVICE_URL`, `REVIEW_SERVICE_URL`
/// - `PRODUCT_TIMEOUT_MS`, `RECOMMENDATION_TIMEOUT_MS`, `REVIEW_TIMEOUT_MS` (default: `2000`)
/// - `UPSTREAM_POOL_SIZE` (default: `10`), `UPSTREAM_QUEUE_DEPTH` (default: `100`)
/// - `EVENT_PARTITIONS`: partitions per topic (default: `2`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub service_address: String,
    pub product_url: String,
    pub recommendation_url: String,
    pub review_url: String,
    pub product_timeout: Duration,
    pub recommendation_timeout: Duration,
    pub review_timeout: Duration,
    pub pool_size: usize,
    pub queue_depth: usize,
    pub event_partitions: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let millis = |key: &str, default: Duration| {
            parsed(key).map(Duration::from_millis).unwrap_or(default)
        };

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let service_address = lookup("SERVICE_ADDRESS").unwrap_or_else(|| {
            let host = lookup("HOSTNAME").unwrap_or_else(|| "localhost".to_string());
            format!("{host}:{port}")
        });
        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            service_address,
            product_url: lookup("PRODUCT_SERVICE_URL").unwrap_or(defaults.product_url),
            recommendation_url: lookup("RECOMMENDATION_SERVICE_URL")
                .unwrap_or(defaults.recommendation_url),
            review_url: lookup("REVIEW_SERVICE_URL").unwrap_or(defaults.review_url),
            product_timeout: millis("PRODUCT_TIMEOUT_MS", defaults.product_timeout),
            recommendation_timeout: millis(
                "RECOMMENDATION_TIMEOUT_MS",
                defaults.recommendation_timeout,
            ),
            review_timeout: millis("REVIEW_TIMEOUT_MS", defaults.review_timeout),
            pool_size: parsed("UPSTREAM_POOL_SIZE").map_or(defaults.pool_size, |v| v as usize),
            queue_depth: parsed("UPSTREAM_QUEUE_DEPTH")
                .map_or(defaults.queue_depth, |v| v as usize),
            event_partitions: parsed("EVENT_PARTITIONS")
                .map_or(defaults.event_partitions, |v| v as usize),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upstream endpoints and pool sizing for the orchestrator.
    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            product: ServiceEndpoint::new(&self.product_url, self.product_timeout),
            recommendation: ServiceEndpoint::new(
                &self.recommendation_url,
                self.recommendation_timeout,
            ),
            review: ServiceEndpoint::new(&self.review_url, self.review_timeout),
            pool_size: self.pool_size,
            queue_depth: self.queue_depth,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let upstream = UpstreamConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 7000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            service_address: "localhost:7000".to_string(),
            product_url: upstream.product.base_url,
            recommendation_url: upstream.recommendation.base_url,
            review_url: upstream.review.base_url,
            product_timeout: upstream.product.timeout,
            recommendation_timeout: upstream.recommendation.timeout,
            review_timeout: upstream.review.timeout,
            pool_size: upstream.pool_size,
            queue_depth: upstream.queue_depth,
            event_partitions: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.product_url, "http://product:8080");
        assert_eq!(config.review_timeout, Duration::from_millis(2000));
        assert_eq!(config.event_partitions, 2);
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.addr(), "0.0.0.0:7000");
        assert_eq!(config.service_address, "localhost:7000");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.queue_depth, 100);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "8081"),
            ("HOSTNAME", "composite-7f9"),
            ("LOG_FORMAT", "JSON"),
            ("PRODUCT_SERVICE_URL", "http://localhost:9001"),
            ("RECOMMENDATION_TIMEOUT_MS", "250"),
            ("UPSTREAM_POOL_SIZE", "4"),
            ("EVENT_PARTITIONS", "8"),
        ]);
        assert_eq!(config.port, 8081);
        assert_eq!(config.service_address, "composite-7f9:8081");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.product_url, "http://localhost:9001");
        assert_eq!(config.recommendation_timeout, Duration::from_millis(250));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.event_partitions, 8);
    }

    #[test]
    fn test_explicit_service_address_wins() {
        let config = from_pairs(&[("SERVICE_ADDRESS", "10.0.0.5:7000"), ("HOSTNAME", "x")]);
        assert_eq!(config.service_address, "10.0.0.5:7000");
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = from_pairs(&[("PORT", "http"), ("REVIEW_TIMEOUT_MS", "soon")]);
        assert_eq!(config.port, 7000);
        assert_eq!(config.review_timeout, Duration::from_millis(2000));
    }

    #[test]
    fn test_upstream_mapping() {
        let config = from_pairs(&[("REVIEW_SERVICE_URL", "http://r:1"), ("REVIEW_TIMEOUT_MS", "10")]);
        let upstream = config.upstream();
        assert_eq!(upstream.review.base_url, "http://r:1");
        assert_eq!(upstream.review.timeout, Duration::from_millis(10));
        assert_eq!(upstream.product.base_url, "http://product:8080");
        assert_eq!(upstream.pool_size, 10);
    }
}
