use thiserror::Error;

/// Failures surfaced by the client, resolver, location provider and
/// coordinator.
///
/// Kept `Clone + PartialEq` so the latest one can be published as part of
/// [`crate::AppState`]. Transport errors are captured as their message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No results found for '{0}'")]
    NoResults(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Unauthorized: the API key was rejected")]
    Unauthorized,

    #[error("Rate limited by the weather provider")]
    RateLimited,

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request failed with status {status}: {message}")]
    Client { status: u16, message: String },

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("A location request is already in progress")]
    AlreadyInProgress,

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl WeatherError {
    /// Classify a non-success HTTP status and its (already truncated) body.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => WeatherError::Unauthorized,
            429 => WeatherError::RateLimited,
            s if s >= 500 => WeatherError::Server { status: s, message },
            s => WeatherError::Client { status: s, message },
        }
    }

    /// Returns a short message suitable for showing next to stale weather.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::InvalidRequest(_) => "Please enter a city, state, or country code.",
            WeatherError::NoResults(_) => "No matching place was found.",
            WeatherError::Network(_) => "Unable to connect. Check your internet connection.",
            WeatherError::Decode(_) => "Received an unexpected response. Please try again.",
            WeatherError::Unauthorized => "The weather service rejected the API key.",
            WeatherError::RateLimited => "Too many requests. Please wait a moment.",
            WeatherError::Server { .. } => {
                "The weather service is experiencing issues. Please try again later."
            }
            WeatherError::Client { .. } => "The request failed. Please try again.",
            WeatherError::LocationUnavailable(_) => "Your location could not be determined.",
            WeatherError::AlreadyInProgress => "Still finding your location.",
            WeatherError::Unknown(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WeatherError::Decode(err.to_string())
        } else if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            WeatherError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            WeatherError::from_status(status.as_u16(), err.to_string())
        } else {
            WeatherError::Unknown(err.to_string())
        }
    }
}
