//! Pure mapping from [`WidgetState`] to a view tree.
//!
//! The tree is plain data so it can be inspected in tests; [`View`]'s
//! `Display` impl is the terminal rendering used by the CLI.

use chrono::{DateTime, FixedOffset, Locale, Offset, Utc};
use std::fmt;

use crate::model::{CurrentWeather, DailyForecast};
use crate::state::{UiState, WidgetState};

pub const DEFAULT_ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";
pub const SEARCH_PLACEHOLDER: &str = "Suche nach Ort oder PLZ";
pub const ERROR_MESSAGE: &str = "Error";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Base URL icon codes are appended to.
    pub icon_base_url: String,
    /// Offset used to turn forecast timestamps into calendar days.
    pub offset: FixedOffset,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            offset: Utc.fix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub search: SearchField,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchField {
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Loading,
    Error(ErrorPanel),
    Content(ContentPanel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPanel {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentPanel {
    /// Absent before the first successful fetch.
    pub current: Option<CurrentPanel>,
    pub stats: Vec<Stat>,
    pub days: Vec<DayCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPanel {
    pub icon: Icon,
    pub description: String,
    /// Rounded up to whole degrees.
    pub temperature: i64,
    pub place_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub value: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCard {
    pub weekday: String,
    pub date: String,
    pub icon: Icon,
    pub description: String,
    pub temp_max: f64,
    pub temp_min: f64,
}

pub fn render(state: &WidgetState, options: &RenderOptions) -> View {
    let body = match state.ui_state() {
        UiState::Loading => Body::Loading,
        UiState::Error => Body::Error(ErrorPanel {
            message: ERROR_MESSAGE.to_string(),
        }),
        UiState::Ready => Body::Content(content_panel(state, options)),
    };

    View {
        search: SearchField {
            placeholder: SEARCH_PLACEHOLDER,
        },
        body,
    }
}

fn content_panel(state: &WidgetState, options: &RenderOptions) -> ContentPanel {
    let current = state.current.as_ref();

    ContentPanel {
        current: current.map(|c| CurrentPanel {
            icon: icon(options, &c.icon, &c.description),
            description: c.description.clone(),
            temperature: ceil_degrees(c.temperature),
            place_name: c.place_name.clone(),
        }),
        stats: current.map(stats).unwrap_or_default(),
        days: state
            .weekly
            .iter()
            .flat_map(|w| w.days.iter())
            .map(|day| day_card(day, options))
            .collect(),
    }
}

fn stats(current: &CurrentWeather) -> Vec<Stat> {
    vec![
        Stat {
            value: format!("{} m/s", current.wind_speed),
            label: "Wind",
        },
        Stat {
            value: format!("{} °", ceil_degrees(current.feels_like)),
            label: "Gefühlt Temperatur",
        },
        Stat {
            value: format!("{} °", ceil_degrees(current.temp_max)),
            label: "Maximale Temperatur",
        },
    ]
}

fn day_card(day: &DailyForecast, options: &RenderOptions) -> DayCard {
    let (weekday, date) = match DateTime::from_timestamp(day.date, 0) {
        Some(utc) => {
            let local = utc.with_timezone(&options.offset);
            (
                local.format_localized("%A", Locale::de_DE).to_string(),
                local.format_localized("%-d. %B %Y", Locale::de_DE).to_string(),
            )
        }
        None => (String::new(), String::new()),
    };

    DayCard {
        weekday,
        date,
        icon: icon(options, &day.icon, &day.description),
        description: day.description.clone(),
        temp_max: day.temp_max,
        temp_min: day.temp_min,
    }
}

fn icon(options: &RenderOptions, code: &str, description: &str) -> Icon {
    Icon {
        url: format!("{}/{code}@2x.png", options.icon_base_url.trim_end_matches('/')),
        alt: description.to_string(),
    }
}

// Casting also turns -0.0 into 0.
fn ceil_degrees(value: f64) -> i64 {
    value.ceil() as i64
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ {} ]", self.search.placeholder)?;

        match &self.body {
            Body::Loading => writeln!(f, "Lädt ..."),
            Body::Error(panel) => writeln!(f, "{}", panel.message),
            Body::Content(panel) => write!(f, "{panel}"),
        }
    }
}

impl fmt::Display for ContentPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(current) = &self.current {
            writeln!(f, "{} °  {}", current.temperature, current.place_name)?;
            writeln!(f, "{} ({})", current.description, current.icon.url)?;
        }

        for stat in &self.stats {
            writeln!(f, "  {:<20} {}", stat.label, stat.value)?;
        }

        if !self.days.is_empty() {
            writeln!(f)?;
        }
        for day in &self.days {
            writeln!(
                f,
                "{:<10} {:<18} {:<24} Max {} ° - Min {} °",
                day.weekday, day.date, day.description, day.temp_max, day.temp_min
            )?;
        }

        Ok(())
    }
}
