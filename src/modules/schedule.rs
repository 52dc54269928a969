//! Schedule module - Turns Airtime schedule payloads into chat-ready text
//!
//! Everything in here is pure. The services layer fetches the JSON, this
//! module only parses and renders it.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Time zone tag appended to single-show and single-day output
const GERMAN_TIME: &str = "_🇩🇪 time!_";

/// Trailing line of the week overview
const WEEK_FOOTER: &str = "_ All shows are in 🇩🇪 time!_";

/// Prefix the schedule service uses for the Monday after the current week
const NEXT_PREFIX: &str = "next";

pub const NO_SHOWS_THIS_WEEK: &str = "No shows scheduled for this week. Stay tuned!";
pub const NOTHING_ON_AIR: &str = "Nothing being broadcasted at the moment.";
pub const NOTHING_NEXT: &str = "Nothing else scheduled for today.";
pub const WEEK_HINT: &str = "Use `/week` to see the whole schedule.";

/// Calendar order for the week overview
const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Malformed show timestamp: {0:?}")]
    MalformedTimestamp(String),
}

/// A single scheduled program as the schedule service returns it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Show {
    pub name: String,
    pub starts: String,
    pub ends: String,
}

impl Show {
    /// Extract start/end clock times and a display-safe name.
    ///
    /// Timestamps are expected as `YYYY-MM-DD HH:MM:SS`; the clock time is
    /// the fixed slice `[len-8, len-3)`, not a parsed value.
    pub fn parse(&self) -> Result<ParsedShow, ScheduleError> {
        Ok(ParsedShow {
            starts: clock_time(&self.starts)?.to_string(),
            ends: clock_time(&self.ends)?.to_string(),
            name: escape_markdown(&unescape_html(&self.name)),
        })
    }

    /// Weekday the show starts on
    pub fn weekday(&self) -> Result<Weekday, ScheduleError> {
        self.starts
            .get(..10)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map(|date| date.weekday())
            .ok_or_else(|| ScheduleError::MalformedTimestamp(self.starts.clone()))
    }
}

/// A show reduced to what the chat output needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedShow {
    pub starts: String,
    pub ends: String,
    pub name: String,
}

impl ParsedShow {
    /// `*name* (starts - ends _🇩🇪 time!_)`
    pub fn format(&self) -> String {
        format!("*{}* ({} - {} {})", self.name, self.starts, self.ends, GERMAN_TIME)
    }

    /// One line of a day listing
    fn day_line(&self) -> String {
        format!("({} - {}) - *{}*\n", self.starts, self.ends, self.name)
    }
}

/// Shows of a week keyed by lowercase weekday (`monday`, ..., `nextmonday`)
///
/// Non-list entries in the payload (the service mixes in metadata such as
/// its API version) are dropped on decode. Show order is kept as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct WeekSchedule {
    days: HashMap<String, Vec<Show>>,
}

impl TryFrom<Map<String, Value>> for WeekSchedule {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut days = HashMap::new();
        for (key, value) in map {
            if value.is_array() {
                days.insert(key.to_lowercase(), serde_json::from_value(value)?);
            }
        }
        Ok(Self { days })
    }
}

impl WeekSchedule {
    /// Shows for a weekday key, empty when the key is absent
    pub fn shows(&self, weekday: &str) -> &[Show] {
        self.days
            .get(&weekday.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Payload of the live-info endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LiveInfo {
    #[serde(rename = "currentShow", default, deserialize_with = "null_as_empty")]
    pub current_show: Vec<Show>,
    #[serde(rename = "nextShow", default, deserialize_with = "null_as_empty")]
    pub next_show: Vec<Show>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Show>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Show>>::deserialize(deserializer)?.unwrap_or_default())
}

impl LiveInfo {
    pub fn node(&self, node: LiveNode) -> &[Show] {
        match node {
            LiveNode::CurrentShow => &self.current_show,
            LiveNode::NextShow => &self.next_show,
        }
    }
}

/// Which entry of the live-info payload a command looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveNode {
    CurrentShow,
    NextShow,
}

impl LiveNode {
    fn not_found_message(&self) -> &'static str {
        match self {
            LiveNode::CurrentShow => NOTHING_ON_AIR,
            LiveNode::NextShow => NOTHING_NEXT,
        }
    }
}

/// Outcome of looking up the current or next show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveShow {
    Found(ParsedShow),
    NotFound(LiveNode),
}

impl LiveShow {
    pub fn render(&self) -> String {
        match self {
            LiveShow::Found(show) => show.format(),
            LiveShow::NotFound(node) => format!("{}\n{}", node.not_found_message(), WEEK_HINT),
        }
    }
}

/// Pick the first show of `node`, as long as it starts today or tomorrow.
///
/// The live-info endpoint happily returns shows days ahead when the station
/// is idle; anything outside today/tomorrow counts as nothing scheduled.
pub fn select_live_show(
    info: &LiveInfo,
    node: LiveNode,
    today: NaiveDate,
) -> Result<LiveShow, ScheduleError> {
    let Some(show) = info.node(node).first() else {
        return Ok(LiveShow::NotFound(node));
    };

    let weekday = show.weekday()?;
    if weekday != today.weekday() && weekday != today.weekday().succ() {
        return Ok(LiveShow::NotFound(node));
    }

    Ok(LiveShow::Found(show.parse()?))
}

/// Schedule key for the day `offset_days` away from `reference`.
///
/// A forward offset landing on the Monday of a later week yields
/// `nextmonday`, the bucket the service uses for the upcoming Monday.
/// An offset that overflows the calendar resolves to `reference` itself,
/// without prefix.
pub fn resolve_weekday(reference: NaiveDate, offset_days: i64) -> String {
    let Some(target) = reference.checked_add_signed(Duration::days(offset_days)) else {
        return weekday_key(reference.weekday()).to_string();
    };
    let key = weekday_key(target.weekday());

    if offset_days > 0 && target.weekday() == Weekday::Mon && target.iso_week() != reference.iso_week() {
        format!("{}{}", NEXT_PREFIX, key)
    } else {
        key.to_string()
    }
}

/// Listing for a single day, or an empty string when the day has no shows
pub fn format_day(schedule: &WeekSchedule, weekday: &str) -> Result<String, ScheduleError> {
    let body = day_lines(schedule.shows(weekday))?;
    if body.is_empty() {
        return Ok(String::new());
    }

    Ok(format!("Shows for {} {}\n{}", day_title(weekday), GERMAN_TIME, body))
}

/// Listing for Monday through Sunday, skipping days without shows
pub fn format_week(schedule: &WeekSchedule) -> Result<String, ScheduleError> {
    let mut msg = String::new();

    for weekday in WEEK {
        let key = weekday_key(weekday);
        let body = day_lines(schedule.shows(key))?;
        if body.is_empty() {
            continue;
        }
        msg.push_str(&format!("*Shows for {}*\n", day_title(key)));
        msg.push_str(&body);
    }

    if msg.is_empty() {
        return Ok(NO_SHOWS_THIS_WEEK.to_string());
    }

    msg.push_str(WEEK_FOOTER);
    Ok(msg)
}

/// Display name for a weekday key: `nextmonday` -> `Monday`
pub fn day_title(weekday: &str) -> String {
    let lower = weekday.to_lowercase();
    let day = lower.strip_prefix(NEXT_PREFIX).unwrap_or(&lower);

    let mut chars = day.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn day_lines(shows: &[Show]) -> Result<String, ScheduleError> {
    shows
        .iter()
        .map(|show| show.parse().map(|parsed| parsed.day_line()))
        .collect()
}

fn clock_time(timestamp: &str) -> Result<&str, ScheduleError> {
    let len = timestamp.len();
    len.checked_sub(8)
        .and_then(|start| timestamp.get(start..len - 3))
        .ok_or_else(|| ScheduleError::MalformedTimestamp(timestamp.to_string()))
}

fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Backslash-escape characters that would break out of a `*bold*` span
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '!') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
