//! Turns a [`PlaceQuery`] into a [`ResolvedPlace`].

use std::sync::Arc;

use crate::{Coordinate, PlaceQuery, ResolvedPlace, WeatherError, WeatherProvider};

#[derive(Debug, Clone)]
pub struct PlaceResolver {
    provider: Arc<dyn WeatherProvider>,
}

impl PlaceResolver {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Resolve text or a coordinate. Failures are passed through untouched and never retried.
    ///
    /// `DeviceLocation` must be replaced with a coordinate by the caller first;
    /// it is rejected with `InvalidRequest` here.
    pub async fn resolve(&self, query: &PlaceQuery) -> Result<ResolvedPlace, WeatherError> {
        match query {
            PlaceQuery::ByText(text) => self.provider.geocode_by_text(text).await,
            PlaceQuery::ByCoordinate(coordinate) => self.resolve_coordinate(*coordinate).await,
            PlaceQuery::DeviceLocation => Err(WeatherError::InvalidRequest(
                "device location must be substituted with a coordinate before resolving"
                    .to_string(),
            )),
        }
    }

    async fn resolve_coordinate(&self, coordinate: Coordinate) -> Result<ResolvedPlace, WeatherError> {
        let coordinate = Coordinate::new(coordinate.latitude, coordinate.longitude)?;
        let name = self.provider.reverse_geocode(coordinate).await?;

        tracing::debug!(%coordinate, %name, "reverse geocoded");
        Ok(ResolvedPlace::new(coordinate, name))
    }
}
