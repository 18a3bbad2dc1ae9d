use async_trait::async_trait;
use weathercast_core::{Authorization, Coordinate, DeviceLocation, WeatherError};

/// Terminal stand-in for platform location services.
///
/// A terminal has no location hardware, so access is granted only when the
/// user passed a position with `--at`; otherwise it behaves as denied.
#[derive(Debug, Clone, Copy)]
pub struct CliLocation {
    fix: Option<Coordinate>,
}

impl CliLocation {
    pub fn new(fix: Option<Coordinate>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl DeviceLocation for CliLocation {
    fn authorization(&self) -> Authorization {
        Authorization::NotDetermined
    }

    async fn request_authorization(&self) -> Authorization {
        if self.fix.is_some() { Authorization::Authorized } else { Authorization::Denied }
    }

    async fn request_fix(&self) -> Result<Coordinate, WeatherError> {
        self.fix
            .ok_or_else(|| WeatherError::LocationUnavailable("no position given".to_string()))
    }
}

/// Parse "LAT,LON" as given to `--at`.
pub fn parse_coordinate(s: &str) -> Result<Coordinate, String> {
    let (lat, lon) =
        s.split_once(',').ok_or_else(|| format!("expected LAT,LON but got '{s}'"))?;

    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;

    Coordinate::new(lat, lon).map_err(|e| e.to_string())
}
