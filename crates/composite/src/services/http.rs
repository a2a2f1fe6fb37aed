use serde::de::DeserializeOwned;

use crate::classify::{classify_response, classify_transport};
use crate::config::ServiceEndpoint;
use crate::error::{CompositeError, Result};

/// JSON-over-HTTP client bound to one upstream service.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    domain: &'static str,
    endpoint: ServiceEndpoint,
    client: reqwest::Client,
}

impl HttpUpstream {
    /// Builds a client whose every request is bounded by the endpoint timeout.
    pub fn new(domain: &'static str, endpoint: ServiceEndpoint) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| {
                CompositeError::Unexpected(format!("failed to build {domain} client: {e}"))
            })?;

        Ok(Self {
            domain,
            endpoint,
            client,
        })
    }

    /// Issues a GET and decodes the JSON body, classifying any failure.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint.url(path);
        tracing::debug!(domain = self.domain, %url, "calling upstream");

        let result = self.fetch(&url).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::counter!(
            "upstream_calls_total",
            "domain" => self.domain,
            "outcome" => outcome
        )
        .increment(1);

        result
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport(self.domain, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = body_or_empty(self.domain, response.text().await);
            let fallback = format!(
                "{} {} from GET {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                url
            );
            return Err(classify_response(self.domain, status, &body, &fallback));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| classify_transport(self.domain, &e))
    }
}

/// An unreadable error body is classified as if it were empty.
fn body_or_empty(domain: &str, body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| {
        tracing::debug!(domain, error = %e, "failed to read error body");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreadable_body_falls_back_to_empty() {
        let err = reqwest::get("http://127.0.0.1:1").await.unwrap_err();
        assert_eq!(body_or_empty("product", Err(err)), "");
        assert_eq!(body_or_empty("product", Ok("boom".to_string())), "boom");
    }
}
