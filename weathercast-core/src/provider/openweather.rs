use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{Config, Coordinate, ResolvedPlace, WeatherError, WeatherSnapshot};

use super::WeatherProvider;

const UNITS: &str = "imperial";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    weather_url: String,
    geocoding_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        weather_url: &str,
        geocoding_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            weather_url: weather_url.trim_end_matches('/').to_string(),
            geocoding_url: geocoding_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?.to_owned();
        let provider =
            Self::new(api_key, &config.weather_url, &config.geocoding_url, config.timeout())?;
        Ok(provider)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, WeatherError> {
        tracing::debug!(url, what, "sending OpenWeather request");

        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::Network(format!("{what} request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Network(format!("failed to read {what} response: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, what, "OpenWeather request rejected");
            return Err(WeatherError::from_status(status.as_u16(), truncate_body(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Decode(format!("invalid {what} response: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwGeocoding {
    lat: f64,
    lon: f64,
    name: String,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode_by_text(&self, query: &str) -> Result<ResolvedPlace, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::InvalidRequest("search text is empty".to_string()));
        }

        let url = format!("{}/direct", self.geocoding_url);
        let matches: Vec<OwGeocoding> = self
            .get_json(&url, &[("q", query.to_string()), ("limit", "1".to_string())], "geocode")
            .await?;

        let first =
            matches.into_iter().next().ok_or_else(|| WeatherError::NoResults(query.to_string()))?;

        let coordinate = Coordinate::new(first.lat, first.lon)
            .map_err(|e| WeatherError::Decode(format!("geocode returned {e}")))?;

        Ok(ResolvedPlace::new(coordinate, first.name))
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, WeatherError> {
        let url = format!("{}/reverse", self.geocoding_url);
        let matches: Vec<OwGeocoding> = self
            .get_json(
                &url,
                &[
                    ("lat", coordinate.latitude.to_string()),
                    ("lon", coordinate.longitude.to_string()),
                    ("limit", "1".to_string()),
                ],
                "reverse geocode",
            )
            .await?;

        matches
            .into_iter()
            .next()
            .map(|g| g.name)
            .ok_or_else(|| WeatherError::NoResults(coordinate.to_string()))
    }

    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        self.get_json(
            &self.weather_url,
            &[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("units", UNITS.to_string()),
            ],
            "weather",
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
