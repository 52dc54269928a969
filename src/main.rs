//! Keith F'em BotMeister
//!
//! A Discord bot for the Keith F'em community radio:
//! - What is on air now and next
//! - Schedule for today, tomorrow and the whole week
//! - Dad jokes, donation link and station info

use anyhow::Result;
use keithfem_bot::{bot, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    if std::path::Path::new(".env").exists() {
        dotenvy::dotenv()?;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Keith F'em bot starting...");

    let config = Config::load()?;
    info!("Configuration loaded");
    info!("Schedule service: {}", config.radio.base_url);
    info!("Station timezone: {}", config.radio.timezone);
    info!("Joke service: {}", config.joke.url);
    info!("HTTP timeout: {}s", config.http.timeout_secs);

    // Start Discord bot (blocks)
    info!("Starting Discord bot...");
    bot::run(config).await?;

    info!("Keith F'em bot shutting down");

    Ok(())
}
