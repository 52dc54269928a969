//! Airtime schedule service client

use super::http::{FetchError, HttpClient};
use crate::modules::schedule::{LiveInfo, WeekSchedule};
use reqwest::header::HeaderMap;

/// Fetches live and weekly schedule data from the station's Airtime API
#[derive(Debug, Clone)]
pub struct RadioService {
    http: HttpClient,
    base_url: String,
}

impl RadioService {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current and upcoming show
    pub async fn live_info(&self) -> Result<LiveInfo, FetchError> {
        self.http
            .get_json(&self.endpoint("live-info"), HeaderMap::new())
            .await
    }

    /// Shows for every day of the week, plus `nextmonday`
    pub async fn week_info(&self) -> Result<WeekSchedule, FetchError> {
        self.http
            .get_json(&self.endpoint("week-info"), HeaderMap::new())
            .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
