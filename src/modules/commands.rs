//! Command resolver - Decides what each chat command answers with
//!
//! Static commands answer with canned text. Everything else fetches fresh
//! data and hands it to the schedule formatter; failures are recovered here
//! so the user always gets a reply.

use crate::modules::schedule::{self, LiveNode, WEEK_HINT};
use crate::services::Services;
use chrono::NaiveDate;
use tracing::{info, warn};

pub const ABOUT_TEXT: &str = "Keith F'em, a community radio experiment, is presented by Keith \
                              in conjunction with SP2. `hello@keithfem.com`\n\
                              Bot created in Barcelona during the COVID-19 outbreak quarantine \
                              (March 2020) ✌️";

pub const HELP_TEXT: &str = "`/about`: the old and boring about command.\n\
                             `/now`: show what is on the air at the moment.\n\
                             `/next`: displays the upcoming show.\n\
                             `/today`: displays the schedule for today.\n\
                             `/tomorrow`: displays the schedule for tomorrow.\n\
                             `/week`: displays the shows for the week.\n\
                             `/joke`: KeithF'em BotMeister, tell me a joke.\n\
                             `/donate`: donate to Keith F'em.\n\
                             `/help`: this help.\n";

pub const DONATE_TEXT: &str = "[https://www.paypal.me/keithfem]";

pub const SCHEDULE_UNAVAILABLE: &str = "We cannot tell you at the moment.";
pub const JOKE_UNAVAILABLE: &str = "Nothing to say about that.";

/// Every command the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    About,
    Help,
    Donate,
    Joke,
    Now,
    Next,
    Today,
    Tomorrow,
    Week,
}

/// What a command needs to produce its answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Static(&'static str),
    Joke,
    Live(LiveNode),
    /// Schedule key of the day to show (`tuesday`, `nextmonday`, ...)
    Day(String),
    Week,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::About => "about",
            Command::Help => "help",
            Command::Donate => "donate",
            Command::Joke => "joke",
            Command::Now => "now",
            Command::Next => "next",
            Command::Today => "today",
            Command::Tomorrow => "tomorrow",
            Command::Week => "week",
        }
    }

    /// Whether answering requires a call to an external service
    pub fn fetches(self) -> bool {
        !matches!(self, Command::About | Command::Help | Command::Donate)
    }

    /// Resolve the command against the station's current date
    pub fn request(self, today: NaiveDate) -> Request {
        match self {
            Command::About => Request::Static(ABOUT_TEXT),
            Command::Help => Request::Static(HELP_TEXT),
            Command::Donate => Request::Static(DONATE_TEXT),
            Command::Joke => Request::Joke,
            Command::Now => Request::Live(LiveNode::CurrentShow),
            Command::Next => Request::Live(LiveNode::NextShow),
            Command::Today => Request::Day(schedule::resolve_weekday(today, 0)),
            Command::Tomorrow => Request::Day(schedule::resolve_weekday(today, 1)),
            Command::Week => Request::Week,
        }
    }
}

impl Request {
    fn fallback(&self) -> &'static str {
        match self {
            Request::Joke => JOKE_UNAVAILABLE,
            _ => SCHEDULE_UNAVAILABLE,
        }
    }
}

/// Produce the reply for `command`. Never fails: fetch and parse errors
/// are logged and answered with a fallback message.
pub async fn respond(command: Command, services: &Services, today: NaiveDate) -> String {
    info!("Handling /{} for {}", command.name(), today);

    let request = command.request(today);
    match render(&request, services, today).await {
        Ok(msg) => msg,
        Err(e) => {
            warn!("/{} failed: {:#}", command.name(), e);
            request.fallback().to_string()
        }
    }
}

async fn render(request: &Request, services: &Services, today: NaiveDate) -> anyhow::Result<String> {
    match request {
        Request::Static(text) => Ok(text.to_string()),
        Request::Joke => Ok(services.joke.fetch().await?),
        Request::Live(node) => {
            let info = services.radio.live_info().await?;
            Ok(schedule::select_live_show(&info, *node, today)?.render())
        }
        Request::Day(weekday) => {
            let week = services.radio.week_info().await?;
            let msg = schedule::format_day(&week, weekday)?;
            if msg.is_empty() {
                return Ok(no_shows_for(weekday));
            }
            Ok(msg)
        }
        Request::Week => {
            let week = services.radio.week_info().await?;
            Ok(schedule::format_week(&week)?)
        }
    }
}

fn no_shows_for(weekday: &str) -> String {
    format!("No shows scheduled for {}.\n{}", schedule::day_title(weekday), WEEK_HINT)
}
