use crate::{
    Config, Coordinate, ResolvedPlace, WeatherError, WeatherSnapshot,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// The three network operations the rest of the crate needs.
///
/// Calls are independent of each other; implementations share one transport.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Forward geocode free text, taking the provider's first match.
    async fn geocode_by_text(&self, query: &str) -> Result<ResolvedPlace, WeatherError>;

    /// Display name of the place at `coordinate`.
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, WeatherError>;

    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Arc::new(provider))
}
