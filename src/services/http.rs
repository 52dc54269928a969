//! Thin HTTP GET wrapper shared by the schedule and joke clients

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from talking to an external service
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure or non-2xx status
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The body was not the JSON we expected
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A header the service insists on was not configured
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
}

/// HTTP client with a request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Setup(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET `url` and return the body as text
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;

        response.text().await.map_err(transport)
    }

    /// GET `url` and decode the body as JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<T, FetchError> {
        let body = self.get(url, headers).await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::header::{HeaderValue, ACCEPT};
    use serde_json::{json, Value};

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_forwards_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/joke").header("accept", "text/plain");
            then.status(200).body("a labracadabrador");
        });

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));

        let body = client().get(&server.url("/joke"), headers).await.unwrap();
        assert_eq!(body, "a labracadabrador");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_non_success_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/week-info");
            then.status(503).body("maintenance");
        });

        let err = client()
            .get(&server.url("/week-info"), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_get_unreachable_is_transport_error() {
        let err = client()
            .get("http://127.0.0.1:1/live-info", HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/live-info");
            then.status(200).body("<html>not json</html>");
        });

        let err = client()
            .get_json::<Value>(&server.url("/live-info"), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/live-info");
            then.status(200).json_body(json!({"currentShow": []}));
        });

        let value: Value = client()
            .get_json(&server.url("/live-info"), HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(value, json!({"currentShow": []}));
    }
}
