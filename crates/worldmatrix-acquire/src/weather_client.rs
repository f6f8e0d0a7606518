//! Remote weather API client (OpenWeather-shaped).
//!
//! Requests current conditions by the provider's city identifier when the
//! registry supplies one, otherwise by coordinates.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use worldmatrix_core::UnitSystem;

use crate::error::WeatherApiError;
use crate::registry::CityProfile;

const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5/weather";
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// One current-conditions reading as returned by the provider, already in
/// the requested unit system.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub temperature: f64,
    pub condition: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Result<Self, WeatherApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: OPENWEATHER_API_BASE.to_string(),
            api_key,
        })
    }

    #[cfg(test)]
    pub fn new_with_base_url(api_key: String, base_url: &str) -> Result<Self, WeatherApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    /// Fetch current conditions for a city profile.
    pub async fn fetch_current(
        &self,
        profile: &CityProfile,
        units: UnitSystem,
    ) -> Result<WeatherObservation, WeatherApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        match &profile.weather_provider_id {
            Some(id) => query.push(("id", id.clone())),
            None => {
                query.push(("lat", profile.latitude.to_string()));
                query.push(("lon", profile.longitude.to_string()));
            }
        }
        query.push(("appid", self.api_key.clone()));
        query.push(("units", units.as_str().to_string()));

        let response = self.client.get(&self.base_url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherApiError::Status(status.as_u16()));
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| WeatherApiError::Parse(e.to_string()))?;

        let condition = body
            .weather
            .first()
            .ok_or(WeatherApiError::MissingField("weather"))?;

        Ok(WeatherObservation {
            temperature: body.main.temp,
            condition: title_case(&condition.description),
            humidity: body.main.humidity,
            wind_speed: body.wind.speed,
        })
    }
}

/// "scattered clouds" -> "Scattered Clouds".
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
