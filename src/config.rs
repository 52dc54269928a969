//! Configuration management for the Keith F'em bot

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub radio: RadioConfig,
    #[serde(default)]
    pub joke: JokeConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadioConfig {
    /// Airtime API root, e.g. `https://station.airtime.pro/api`
    pub base_url: String,
    /// Station time zone; decides what "today" means
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Europe/Berlin".to_string()
}

impl RadioConfig {
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid radio timezone {:?}: {}", self.timezone, e))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JokeConfig {
    #[serde(default = "default_joke_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for JokeConfig {
    fn default() -> Self {
        Self {
            url: default_joke_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_joke_url() -> String {
    "https://icanhazdadjoke.com/".to_string()
}

fn default_user_agent() -> String {
    "Keith F'em Bot (https://github.com/mazzi/keithfembot)".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from keithfem.toml
    pub fn load() -> Result<Self> {
        Self::load_from("keithfem.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            // Fall back to environment variables only
            Self::from_env()?
        };

        config.radio.tz()?;
        Ok(config)
    }

    /// Parse a TOML document, expanding `${VAR}` references in secrets
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.expand_env_vars();
        Ok(config)
    }

    /// Load configuration entirely from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            discord: DiscordConfig {
                token: std::env::var("DISCORD_TOKEN")
                    .context("DISCORD_TOKEN environment variable required")?,
                guild_id: std::env::var("DISCORD_GUILD_ID")
                    .ok()
                    .and_then(|s| s.parse().ok()),
            },
            radio: RadioConfig {
                base_url: std::env::var("RADIO_BASE_URL")
                    .context("RADIO_BASE_URL environment variable required")?,
                timezone: std::env::var("RADIO_TIMEZONE").unwrap_or_else(|_| default_timezone()),
            },
            joke: JokeConfig {
                url: std::env::var("JOKE_URL").unwrap_or_else(|_| default_joke_url()),
                user_agent: std::env::var("JOKE_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            },
            http: HttpConfig {
                timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_timeout_secs),
            },
        })
    }

    /// Expand ${VAR} patterns in string fields
    fn expand_env_vars(&mut self) {
        self.discord.token = expand_env(&self.discord.token);
        self.radio.base_url = expand_env(&self.radio.base_url);
    }
}

/// Expand ${VAR} patterns in a string
fn expand_env(s: &str) -> String {
    let mut result = s.to_string();

    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let replacement = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], replacement, &result[start + end + 1..]);
        } else {
            break;
        }
    }

    result
}
