use serde::{Deserialize, Serialize};

/// Geographic coordinates as returned by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Present-moment conditions for a single location.
///
/// Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Place name as resolved by the provider, not as typed by the user.
    pub place_name: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_max: f64,
    pub wind_speed: f64,
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Unix timestamp (seconds).
    pub date: i64,
    pub description: String,
    pub icon: String,
    pub temp_max: f64,
    pub temp_min: f64,
}

/// Multi-day forecast, one entry per day in provider order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWeather {
    pub days: Vec<DailyForecast>,
}
