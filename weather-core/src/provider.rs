use crate::model::{Coordinates, CurrentWeather, WeeklyWeather};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// The two provider calls the widget makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single provider call.
///
/// The widget does not distinguish between these; every variant ends up as
/// the same error panel.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{endpoint} request failed with status {status}")]
    Status {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
    },

    #[error("failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a free-text location (place name or postal code).
    async fn current_weather(&self, location: &str) -> Result<CurrentWeather, FetchError>;

    /// Daily forecast for the given coordinates.
    async fn weekly_forecast(&self, coordinates: Coordinates) -> Result<WeeklyWeather, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_endpoint_and_code() {
        let err = FetchError::Status {
            endpoint: Endpoint::Forecast,
            status: reqwest::StatusCode::UNAUTHORIZED,
        };

        let msg = err.to_string();
        assert!(msg.contains("forecast"));
        assert!(msg.contains("401"));
    }

    #[test]
    fn decode_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FetchError::Decode {
            endpoint: Endpoint::Current,
            source,
        };

        assert!(err.to_string().starts_with("failed to decode current weather response"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
