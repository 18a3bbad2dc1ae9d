//! Core library for `weathercast`.
//!
//! This crate defines:
//! - Configuration and the OpenWeather client (geocoding + weather)
//! - Place resolution and device location with permission handling
//! - Persistence of the last searched place
//! - `WeatherCoordinator`, which turns user intents into one published state
//!
//! It is used by `weathercast-cli`, but any presentation layer can drive the
//! coordinator and subscribe to its state.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod store;

pub use config::Config;
pub use coordinator::{AppState, Outcome, WeatherCoordinator};
pub use error::WeatherError;
pub use location::{Authorization, DeviceLocation, LocationNotice, LocationProvider};
pub use model::{
    ConditionDetail, Coordinate, CurrentConditions, DailyPoint, FALLBACK_COORDINATE,
    HourlyPoint, PlaceQuery, ResolvedPlace, WeatherSnapshot,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use resolver::PlaceResolver;
pub use store::{FileLastPlaceStore, LastPlaceStore, MemoryLastPlaceStore};
