//! The widget controller: fetch, cache, render for one location.
//!
//! State lives in a `watch` channel so every mutation notifies subscribers,
//! who re-render with [`crate::view::render`]. The channel lock is never held
//! across an await.

use tokio::sync::watch;
use tracing::{debug, info, instrument, trace, warn};

use crate::model::{Coordinates, WeeklyWeather};
use crate::provider::WeatherProvider;
use crate::state::WidgetState;
use crate::store::{KeyValueStore, StoreError};
use crate::view::{self, RenderOptions, View};

/// Storage key of the last confirmed location.
pub const LOCATION_KEY: &str = "location";
/// Cache key of the weekly forecast.
pub const WEEKLY_CACHE_KEY: &str = "weekWeatherData";
/// Location used when nothing has been persisted yet.
pub const DEFAULT_LOCATION: &str = "Wildberg";

#[derive(Debug)]
pub struct WidgetController<P, S, C> {
    provider: P,
    storage: S,
    cache: C,
    default_location: String,
    state: watch::Sender<WidgetState>,
}

impl<P, S, C> WidgetController<P, S, C>
where
    P: WeatherProvider,
    S: KeyValueStore,
    C: KeyValueStore,
{
    pub fn new(provider: P, storage: S, cache: C, default_location: impl Into<String>) -> Self {
        let (state, _) = watch::channel(WidgetState::default());

        Self {
            provider,
            storage,
            cache,
            default_location: default_location.into(),
            state,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state mutation.
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.subscribe()
    }

    pub fn render(&self, options: &RenderOptions) -> View {
        view::render(&self.state.borrow(), options)
    }

    /// Load weather for the persisted location, seeding it with the default
    /// on first run or when the stored value is blank.
    pub async fn initialize(&self) {
        let location = match self.storage.get(LOCATION_KEY) {
            Some(location) if !location.trim().is_empty() => location,
            _ => {
                if let Err(err) = self.storage.set(LOCATION_KEY, &self.default_location) {
                    warn!(error = %err, "failed to persist default location");
                }
                self.default_location.clone()
            }
        };

        self.fetch_current_weather(&location, false).await;
    }

    /// The user committed a new search value.
    pub async fn search_submit(&self, text: &str) {
        self.fetch_current_weather(text.trim(), true).await;
    }

    /// Per-keystroke hook of the search field.
    ///
    /// Intentionally inert: place autocomplete was never built, so this
    /// neither fetches nor suggests anything.
    pub fn search_input(&self, text: &str) -> Vec<String> {
        trace!(len = text.len(), "search input ignored");
        Vec::new()
    }

    /// Fetch current conditions, then the weekly forecast for the returned
    /// coordinates.
    ///
    /// A no-op while another fetch is in flight. With `persist`, the resolved
    /// place name becomes the stored location and the cached forecast is
    /// dropped.
    ///
    /// Must be driven to completion: dropping the future mid-flight leaves
    /// `loading` set, and every later fetch is then dropped by the guard.
    #[instrument(skip(self))]
    pub async fn fetch_current_weather(&self, location: &str, persist: bool) {
        let acquired = self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            state.error = false;
            true
        });

        if !acquired {
            debug!("fetch already in flight, dropping request");
            return;
        }

        let current = match self.provider.current_weather(location).await {
            Ok(current) => current,
            Err(err) => {
                warn!(error = %err, "current weather fetch failed");
                self.state.send_modify(|state| {
                    state.error = true;
                    state.loading = false;
                });
                return;
            }
        };

        let coordinates = current.coordinates;

        if persist {
            info!(place = %current.place_name, "location changed");
            if let Err(err) = self.storage.set(LOCATION_KEY, &current.place_name) {
                warn!(error = %err, "failed to persist location");
            }
            if let Err(err) = self.cache.remove(WEEKLY_CACHE_KEY) {
                warn!(error = %err, "failed to invalidate forecast cache");
            }
        }

        self.state.send_modify(|state| state.current = Some(current));

        self.fetch_weekly_weather(coordinates).await;
    }

    /// Fill in the weekly forecast, from the cache when possible.
    ///
    /// Always leaves `loading` false.
    #[instrument(skip(self))]
    pub async fn fetch_weekly_weather(&self, coordinates: Coordinates) {
        if let Some(weekly) = self.cached_weekly() {
            debug!(days = weekly.days.len(), "using cached forecast");
            self.state.send_modify(|state| {
                state.weekly = Some(weekly);
                state.loading = false;
            });
            return;
        }

        match self.provider.weekly_forecast(coordinates).await {
            Ok(weekly) => {
                self.store_weekly(&weekly);
                self.state.send_modify(|state| {
                    state.weekly = Some(weekly);
                    state.loading = false;
                });
            }
            Err(err) => {
                warn!(error = %err, "forecast fetch failed");
                self.state.send_modify(|state| {
                    state.error = true;
                    state.loading = false;
                });
            }
        }
    }

    fn cached_weekly(&self) -> Option<WeeklyWeather> {
        let raw = self.cache.get(WEEKLY_CACHE_KEY)?;

        match serde_json::from_str(&raw) {
            Ok(weekly) => Some(weekly),
            Err(err) => {
                warn!(error = %err, "ignoring undecodable cached forecast");
                None
            }
        }
    }

    fn store_weekly(&self, weekly: &WeeklyWeather) {
        let result = serde_json::to_string(weekly)
            .map_err(StoreError::from)
            .and_then(|json| self.cache.set(WEEKLY_CACHE_KEY, &json));

        if let Err(err) = result {
            warn!(error = %err, "failed to cache forecast");
        }
    }
}
