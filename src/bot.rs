//! Discord bot setup and command registration

use crate::config::Config;
use crate::modules::commands::{self, Command};
use crate::services::Services;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

/// Longest message Discord accepts, counted in characters
const MESSAGE_LIMIT: usize = 2000;

/// Shared state across all commands
#[derive(Debug)]
pub struct Data {
    pub services: Services,
    pub timezone: Tz,
}

impl Data {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            services: Services::new(config)?,
            timezone: config.radio.tz()?,
        })
    }

    /// Current date at the station
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Run the Discord bot
pub async fn run(config: Config) -> Result<()> {
    let token = config.discord.token.clone();
    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILDS;

    let data = Data::new(&config)?;

    // Capture guild_id before the closure
    let guild_id = config.discord.guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                about(),
                help(),
                donate(),
                joke(),
                now(),
                next(),
                today(),
                tomorrow(),
                week(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".to_string()),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    error!("Command error: {:?}", error);
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                // Register commands globally or to a specific guild
                if let Some(gid) = guild_id {
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        serenity::GuildId::new(gid),
                    )
                    .await?;
                    info!("Commands registered to guild {}", gid);
                } else {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Commands registered globally");
                }
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Keith F'em bot connected to Discord");
    client.start().await?;

    Ok(())
}

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot } = event {
        info!("Bot ready as {}", data_about_bot.user.name);
    }
    Ok(())
}

/// Resolve `command` and send the answer back to the channel
async fn reply(ctx: Context<'_>, command: Command) -> Result<(), Error> {
    // Interactions must be acknowledged within three seconds
    if command.fetches() {
        ctx.defer().await?;
    }

    let data = ctx.data();
    let response = commands::respond(command, &data.services, data.today()).await;

    let chunks = split_message(&response, MESSAGE_LIMIT);
    if chunks.len() > 1 {
        debug!("Sending /{} reply in {} parts", command.name(), chunks.len());
    }
    for chunk in chunks {
        ctx.say(chunk).await?;
    }

    Ok(())
}

/// Split `text` into messages of at most `limit` characters.
///
/// Cuts happen after a newline; a single line longer than `limit` is cut
/// mid-line.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let mut chars = line.chars().peekable();
            while chars.peek().is_some() {
                let piece: String = chars.by_ref().take(limit).collect();
                let piece_len = piece.chars().count();
                if piece_len == limit {
                    chunks.push(piece);
                } else {
                    current = piece;
                    current_len = piece_len;
                }
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// The old and boring about command
#[poise::command(slash_command, prefix_command)]
pub async fn about(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::About).await
}

/// List the available commands
#[poise::command(slash_command, prefix_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Help).await
}

/// Donate to Keith F'em
#[poise::command(slash_command, prefix_command)]
pub async fn donate(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Donate).await
}

/// KeithF'em BotMeister, tell me a joke
#[poise::command(slash_command, prefix_command)]
pub async fn joke(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Joke).await
}

/// Show what is on the air at the moment
#[poise::command(slash_command, prefix_command)]
pub async fn now(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Now).await
}

/// Show the upcoming show
#[poise::command(slash_command, prefix_command)]
pub async fn next(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Next).await
}

/// Show the schedule for today
#[poise::command(slash_command, prefix_command)]
pub async fn today(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Today).await
}

/// Show the schedule for tomorrow
#[poise::command(slash_command, prefix_command)]
pub async fn tomorrow(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Tomorrow).await
}

/// Show the shows for the whole week
#[poise::command(slash_command, prefix_command)]
pub async fn week(ctx: Context<'_>) -> Result<(), Error> {
    reply(ctx, Command::Week).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::schedule::{format_week, WeekSchedule};
    use serde_json::json;

    fn long_week() -> String {
        let day: Vec<_> = (0..20)
            .map(|hour| {
                json!({
                    "name": format!("Keith F'em Bot DJ presents the long night number {}", hour),
                    "starts": format!("2020-12-28 {:02}:00:00", hour),
                    "ends": format!("2020-12-28 {:02}:00:00", hour + 1),
                })
            })
            .collect();
        let schedule: WeekSchedule = serde_json::from_value(json!({
            "monday": day.clone(),
            "tuesday": day.clone(),
            "wednesday": day,
        }))
        .unwrap();

        format_week(&schedule).unwrap()
    }

    #[test]
    fn test_split_message_week_over_limit() {
        let week = long_week();
        assert!(week.chars().count() > MESSAGE_LIMIT);

        let chunks = split_message(&week, MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MESSAGE_LIMIT);
        }
        // Every part but the last ends on a line boundary
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.ends_with('\n'));
        }
        assert_eq!(chunks.concat(), week);
    }

    #[test]
    fn test_split_message_short_text_untouched() {
        let chunks = split_message("*Keith F'em Bot DJ* (20:00 - 22:00 _🇩🇪 time!_)", MESSAGE_LIMIT);
        assert_eq!(chunks, vec!["*Keith F'em Bot DJ* (20:00 - 22:00 _🇩🇪 time!_)".to_string()]);
    }

    #[test]
    fn test_split_message_counts_characters() {
        let chunks = split_message("ééé\nab\n", 4);
        assert_eq!(chunks, vec!["ééé\n".to_string(), "ab\n".to_string()]);
    }

    #[test]
    fn test_split_message_long_line() {
        let chunks = split_message("abcdefg\nhi", 3);
        assert_eq!(chunks, vec!["abc", "def", "g\n", "hi"]);
        assert!(split_message("", MESSAGE_LIMIT).is_empty());
    }
}
