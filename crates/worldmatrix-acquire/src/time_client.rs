//! Remote time API client.
//!
//! Requests the current instant for an IANA zone name. Any non-success
//! status or unparseable payload is reported as a typed error so the
//! temporal service can fall through to its local-clock tier.

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::TimeApiError;

const WORLD_TIME_API_BASE: &str = "http://worldtimeapi.org/api/timezone";
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct TimeApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorldTimeResponse {
    datetime: String,
}

impl TimeApiClient {
    pub fn new(api_key: Option<String>) -> Result<Self, TimeApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: WORLD_TIME_API_BASE.to_string(),
            api_key,
        })
    }

    #[cfg(test)]
    pub fn new_with_base_url(api_key: Option<String>, base_url: &str) -> Result<Self, TimeApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    /// Fetch the current instant for a zone name such as `Europe/London`.
    pub async fn fetch_zone_time(&self, zone: &str) -> Result<DateTime<FixedOffset>, TimeApiError> {
        let mut url = format!("{}/{}", self.base_url, zone);
        if let Some(key) = &self.api_key {
            url.push_str(&format!("?key={key}"));
        }

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TimeApiError::Status(status.as_u16()));
        }

        let body: WorldTimeResponse = response
            .json()
            .await
            .map_err(|e| TimeApiError::Parse(e.to_string()))?;

        DateTime::parse_from_rfc3339(&body.datetime).map_err(|e| TimeApiError::Parse(e.to_string()))
    }
}
