//! Core library for the weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind a `WeatherProvider` trait
//! - Key/value stores for the persisted location and the forecast cache
//! - Widget state, the controller driving it and the pure view renderer
//!
//! It is used by `weather-widget-cli`, but the controller is front-end agnostic.

pub mod config;
pub mod controller;
pub mod model;
pub mod provider;
pub mod state;
pub mod store;
pub mod view;

pub use config::Config;
pub use controller::WidgetController;
pub use model::{Coordinates, CurrentWeather, DailyForecast, WeeklyWeather};
pub use provider::{FetchError, WeatherProvider, openweather::OpenWeatherProvider};
pub use state::{UiState, WidgetState};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use view::{RenderOptions, View, render};
