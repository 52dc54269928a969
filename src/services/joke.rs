//! Dad joke service client
//!
//! The joke API refuses requests without a `User-Agent` identifying the bot
//! and an `Accept: text/plain`, so both are checked before anything is sent.

use super::http::{FetchError, HttpClient};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct JokeService {
    http: HttpClient,
    url: String,
    headers: HeaderMap,
}

impl JokeService {
    /// Create a client sending `user_agent` and asking for plain text
    pub fn new(http: HttpClient, url: &str, user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));

        match HeaderValue::from_str(user_agent) {
            Ok(value) => {
                headers.insert(USER_AGENT, value);
            }
            Err(e) => warn!("Ignoring invalid joke user agent {:?}: {}", user_agent, e),
        }

        Self::with_headers(http, url, headers)
    }

    /// Create a client with an explicit header set
    pub fn with_headers(http: HttpClient, url: &str, headers: HeaderMap) -> Self {
        Self {
            http,
            url: url.to_string(),
            headers,
        }
    }

    /// Fetch one joke as plain text
    pub async fn fetch(&self) -> Result<String, FetchError> {
        require_header(&self.headers, USER_AGENT, "User-Agent")?;
        require_header(&self.headers, ACCEPT, "Accept")?;

        let body = self.http.get(&self.url, self.headers.clone()).await?;
        Ok(body.trim().to_string())
    }
}

fn require_header(
    headers: &HeaderMap,
    name: HeaderName,
    label: &'static str,
) -> Result<(), FetchError> {
    match headers.get(&name) {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(FetchError::MissingHeader(label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    const USER_AGENT_VALUE: &str = "Keith F'em Bot (https://github.com/mazzi/keithfembot)";

    fn http() -> HttpClient {
        HttpClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_required_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/")
                .header("accept", "text/plain")
                .header("user-agent", USER_AGENT_VALUE);
            then.status(200)
                .body("what do you call a dog that can do magic tricks? a labracadabrador\n");
        });

        let joke = JokeService::new(http(), &server.url("/"), USER_AGENT_VALUE)
            .fetch()
            .await
            .unwrap();
        assert_eq!(joke, "what do you call a dog that can do magic tricks? a labracadabrador");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_without_accept_never_hits_service() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("joke");
        });

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let err = JokeService::with_headers(http(), &server.url("/"), headers)
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingHeader("Accept")));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_with_empty_user_agent() {
        let err = JokeService::new(http(), "http://127.0.0.1:1/", "")
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingHeader("User-Agent")));
    }
}
