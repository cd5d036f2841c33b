use anyhow::Context;
use chrono::{Local, Offset};
use clap::{Parser, Subcommand};
use inquire::{
    CustomUserError, Password, PasswordDisplayMode, Text,
    autocompletion::{Autocomplete, Replacement},
    validator::Validation,
};
use std::sync::Arc;
use weather_widget_core::{
    Config, FileStore, KeyValueStore, OpenWeatherProvider, RenderOptions, UiState,
    WidgetController,
    controller::{DEFAULT_LOCATION, WEEKLY_CACHE_KEY},
    view::SEARCH_PLACEHOLDER,
};

type Controller = WidgetController<OpenWeatherProvider, FileStore, FileStore>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather widget for the terminal")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key and the default location.
    Configure,

    /// Show weather for the last searched location, or search a new one.
    Show {
        /// Place name or postal code; becomes the remembered location.
        location: Option<String>,
    },

    /// Keep the widget open and search repeatedly.
    Interactive,

    /// Drop the cached weekly forecast.
    ClearCache,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location } => show(location).await,
            Command::Interactive => interactive().await,
            Command::ClearCache => {
                let cache = FileStore::new(Config::cache_file_path()?);
                cache
                    .remove(WEEKLY_CACHE_KEY)
                    .with_context(|| format!("Failed to clear {}", cache.path().display()))?;
                println!("Forecast cache cleared.");
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let default_location = Text::new("Default location:")
        .with_default(&cfg.default_location)
        .with_validator(validate_location)
        .prompt()
        .context("Failed to read default location")?;

    cfg.api_key = Some(api_key.trim().to_string());
    cfg.default_location = default_location.trim().to_string();
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn validate_location(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("Location must not be empty".into()))
    } else {
        Ok(Validation::Valid)
    }
}

fn build(cfg: &Config) -> anyhow::Result<(Controller, RenderOptions)> {
    let controller = WidgetController::new(
        cfg.provider()?,
        FileStore::new(Config::storage_file_path()?),
        FileStore::new(Config::cache_file_path()?),
        default_location(cfg),
    );

    let options = RenderOptions {
        icon_base_url: cfg.icon_base_url.clone(),
        offset: Local::now().offset().fix(),
    };

    Ok((controller, options))
}

/// A hand-edited config may still carry a blank location.
fn default_location(cfg: &Config) -> String {
    match cfg.default_location.trim() {
        "" => DEFAULT_LOCATION.to_string(),
        location => location.to_string(),
    }
}

async fn show(location: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let (controller, options) = build(&cfg)?;

    match location {
        Some(location) => controller.search_submit(&location).await,
        None => controller.initialize().await,
    }

    print!("{}", controller.render(&options));

    if controller.state().ui_state() == UiState::Error {
        anyhow::bail!("Failed to load weather data");
    }
    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let (controller, options) = build(&cfg)?;
    let controller = Arc::new(controller);

    controller.initialize().await;
    print!("{}", controller.render(&options));

    loop {
        let autocomplete = SearchInput(controller.clone());
        let input = tokio::task::spawn_blocking(move || {
            Text::new("Ort:")
                .with_placeholder(SEARCH_PLACEHOLDER)
                .with_autocomplete(autocomplete)
                .prompt_skippable()
        })
        .await
        .context("Search prompt task failed")?
        .context("Failed to read search input")?;

        let Some(text) = input.filter(|text| !text.trim().is_empty()) else {
            return Ok(());
        };

        controller.search_submit(&text).await;
        print!("{}", controller.render(&options));
    }
}

/// Routes every keystroke through the controller's search-input hook.
#[derive(Clone)]
struct SearchInput(Arc<Controller>);

impl Autocomplete for SearchInput {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        Ok(self.0.search_input(input))
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_optional_location() {
        let cli = Cli::try_parse_from(["weather", "show", "Berlin"]).unwrap();
        assert!(matches!(cli.command, Command::Show { location: Some(ref l) } if l == "Berlin"));

        let cli = Cli::try_parse_from(["weather", "-vv", "show"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Show { location: None }));
    }

    #[test]
    fn blank_default_location_is_rejected() {
        assert!(matches!(validate_location("   "), Ok(Validation::Invalid(_))));
        assert!(matches!(validate_location("72202"), Ok(Validation::Valid)));
    }

    #[test]
    fn blank_configured_location_falls_back() {
        let cfg = Config {
            default_location: " ".into(),
            ..Default::default()
        };
        assert_eq!(default_location(&cfg), "Wildberg");

        let cfg = Config {
            default_location: " Berlin ".into(),
            ..Default::default()
        };
        assert_eq!(default_location(&cfg), "Berlin");
    }

    #[test]
    fn clear_cache_is_kebab_case() {
        let cli = Cli::try_parse_from(["weather", "clear-cache"]).unwrap();
        assert!(matches!(cli.command, Command::ClearCache));
    }
}
