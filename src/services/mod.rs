//! Clients for the external services the bot talks to

pub mod http;
pub mod joke;
pub mod radio;

pub use http::{FetchError, HttpClient};
pub use joke::JokeService;
pub use radio::RadioService;

use crate::config::Config;
use std::time::Duration;

/// All outbound clients, built once at startup and shared by every command
#[derive(Debug, Clone)]
pub struct Services {
    pub radio: RadioService,
    pub joke: JokeService,
}

impl Services {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = HttpClient::new(Duration::from_secs(config.http.timeout_secs))?;

        Ok(Self {
            radio: RadioService::new(http.clone(), &config.radio.base_url),
            joke: JokeService::new(http, &config.joke.url, &config.joke.user_agent),
        })
    }
}
