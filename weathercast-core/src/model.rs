use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

use crate::error::WeatherError;

/// Substitute used whenever the device cannot supply a location (San Francisco).
pub const FALLBACK_COORDINATE: Coordinate = Coordinate { latitude: 37.7749, longitude: -122.4194 };

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside [-90, 90] x [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidRequest(format!(
                "coordinate out of range: {latitude}, {longitude}"
            )));
        }

        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What a caller wants weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceQuery {
    ByText(String),
    ByCoordinate(Coordinate),
    DeviceLocation,
}

/// A coordinate paired with its canonical display name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    coordinate: Coordinate,
    display_name: String,
}

impl ResolvedPlace {
    pub fn new(coordinate: Coordinate, display_name: String) -> Self {
        Self { coordinate, display_name }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionDetail {
    pub id: i64,
    pub description: String,
    #[serde(rename = "icon")]
    pub icon_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "temp")]
    pub temperature: f64,
    #[serde(rename = "weather")]
    pub conditions: Vec<ConditionDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HourlyPoint {
    #[serde(rename = "dt")]
    pub timestamp_unix_seconds: i64,
    #[serde(rename = "temp")]
    pub temperature: f64,
    #[serde(rename = "weather")]
    pub conditions: Vec<ConditionDetail>,
}

impl HourlyPoint {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.timestamp_unix_seconds, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "OwDaily")]
pub struct DailyPoint {
    pub timestamp_unix_seconds: i64,
    pub day_temperature: f64,
    pub conditions: Vec<ConditionDetail>,
}

impl DailyPoint {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.timestamp_unix_seconds, 0)
    }
}

/// Current, hourly and daily weather for one coordinate.
///
/// `hourly` and `daily` must be present in the payload, though either may be empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    day: f64,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    dt: i64,
    temp: OwDailyTemp,
    weather: Vec<ConditionDetail>,
}

impl From<OwDaily> for DailyPoint {
    fn from(raw: OwDaily) -> Self {
        Self {
            timestamp_unix_seconds: raw.dt,
            day_temperature: raw.temp.day,
            conditions: raw.weather,
        }
    }
}
