use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::model::{Coordinates, CurrentWeather, DailyForecast, WeeklyWeather};

use super::{Endpoint, FetchError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_LANG: &str = "de";
pub const DEFAULT_UNITS: &str = "metric";

const FORECAST_EXCLUDE: &str = "minutely,hourly,alerts,current";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    lang: String,
    units: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            units: DEFAULT_UNITS.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{path}", self.base_url);

        let res: Response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "OpenWeather {endpoint} request failed");
            return Err(FetchError::Status { endpoint, status });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    max: f64,
    min: f64,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    dt: i64,
    #[serde(default)]
    weather: Vec<OwWeather>,
    temp: OwDailyTemp,
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    #[serde(default)]
    daily: Vec<OwDaily>,
}

/// Description and icon of the first `weather` entry, if any.
fn first_condition(weather: Vec<OwWeather>) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.description, w.icon))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

impl From<OwCurrentResponse> for CurrentWeather {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (description, icon) = first_condition(parsed.weather);

        CurrentWeather {
            place_name: parsed.name,
            coordinates: Coordinates {
                lat: parsed.coord.lat,
                lon: parsed.coord.lon,
            },
            description,
            icon,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_max: parsed.main.temp_max,
            wind_speed: parsed.wind.speed,
        }
    }
}

impl From<OwDaily> for DailyForecast {
    fn from(day: OwDaily) -> Self {
        let (description, icon) = first_condition(day.weather);

        DailyForecast {
            date: day.dt,
            description,
            icon,
            temp_max: day.temp.max,
            temp_min: day.temp.min,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn current_weather(&self, location: &str) -> Result<CurrentWeather, FetchError> {
        let parsed: OwCurrentResponse = self
            .get_json(
                Endpoint::Current,
                "weather",
                &[
                    ("units", self.units.as_str()),
                    ("lang", self.lang.as_str()),
                    ("q", location),
                ],
            )
            .await?;

        Ok(parsed.into())
    }

    #[instrument(skip(self))]
    async fn weekly_forecast(&self, coordinates: Coordinates) -> Result<WeeklyWeather, FetchError> {
        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();

        let parsed: OwOneCallResponse = self
            .get_json(
                Endpoint::Forecast,
                "onecall",
                &[
                    ("exclude", FORECAST_EXCLUDE),
                    ("units", self.units.as_str()),
                    ("lang", self.lang.as_str()),
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                ],
            )
            .await?;

        Ok(WeeklyWeather {
            days: parsed.daily.into_iter().map(DailyForecast::from).collect(),
        })
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_maps_first_condition() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Berlin",
            "coord": { "lat": 52.52, "lon": 13.41 },
            "weather": [
                { "description": "Mäßiger Regen", "icon": "10d" },
                { "description": "Nebel", "icon": "50d" }
            ],
            "main": { "temp": 5.2, "feels_like": 1.9, "temp_max": 6.8 },
            "wind": { "speed": 4.1 }
        }))
        .unwrap();

        let current = CurrentWeather::from(parsed);
        assert_eq!(current.place_name, "Berlin");
        assert_eq!(current.description, "Mäßiger Regen");
        assert_eq!(current.icon, "10d");
        assert_eq!(current.coordinates, Coordinates { lat: 52.52, lon: 13.41 });
    }

    #[test]
    fn missing_weather_entry_degrades_to_unknown() {
        let parsed: OwDaily = serde_json::from_value(serde_json::json!({
            "dt": 1705320000,
            "temp": { "max": 8.0, "min": 2.0 }
        }))
        .unwrap();

        let day = DailyForecast::from(parsed);
        assert_eq!(day.description, "Unknown");
        assert!(day.icon.is_empty());
    }

    #[test]
    fn onecall_without_daily_is_empty() {
        let parsed: OwOneCallResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.daily.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let provider = OpenWeatherProvider::new("KEY".into()).with_base_url("http://localhost:1234/");
        assert_eq!(provider.base_url, "http://localhost:1234");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "ä".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
