use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};

use weather_core::{
    Config, Coordinates, FileHistoryStore, FixedGeolocator, Geolocator, Orchestrator, RelayClient, SearchHistory,
    SearchState, Units, UiEvent,
};

use crate::{locate::PromptGeolocator, presenter::TerminalPresenter};

type TerminalOrchestrator = Orchestrator<TerminalPresenter>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather from the command line, via the weather relay")]
pub struct Cli {
    /// Relay base URL; overrides the configured value.
    #[arg(long, global = true)]
    pub relay_url: Option<String>,

    /// Unit system: metric or imperial; overrides the configured value.
    #[arg(long, global = true)]
    pub units: Option<Units>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the relay URL and default units.
    Configure,

    /// Show weather for a city, or for the most recent search when omitted.
    Show {
        /// City name, e.g. "London" or "Paris, FR".
        city: Option<String>,
    },

    /// Show weather for a position; prompts for it when not given.
    Here {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// List recent searches, or search one of them again.
    History {
        /// 1-based entry to search again.
        #[arg(long)]
        replay: Option<usize>,
    },

    /// List matching places for partial input.
    Suggest {
        text: String,

        /// Choose one of the matches and show its weather.
        #[arg(long)]
        pick: bool,
    },

    /// Prompt for searches until `:q`. This is the default.
    Interactive,
}

const REPL_HELP: &str = "city name | :s text (suggest) | :loc (my location) | :u (toggle units) | :h N (history) | :q";

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let command = self.command.unwrap_or(Command::Interactive);
        let config = Config::load()?.with_overrides(self.relay_url, self.units);
        tracing::debug!(relay = %config.relay_url, units = %config.default_units, "configuration loaded");

        let state = match command {
            Command::Configure => {
                configure()?;
                return Ok(ExitCode::SUCCESS);
            }
            Command::Show { city: Some(city) } => {
                let mut app = orchestrator(&config, Arc::new(PromptGeolocator))?;
                app.handle(UiEvent::Submit(city)).await
            }
            Command::Show { city: None } => {
                let mut app = orchestrator(&config, Arc::new(PromptGeolocator))?;
                let state = app.handle(UiEvent::PageLoaded).await;
                if app.history().is_empty() {
                    println!("No recent searches. Try `weather show <city>`.");
                }
                state
            }
            Command::Here { lat, lon } => {
                let geolocator: Arc<dyn Geolocator> = match lat.zip(lon) {
                    Some((lat, lon)) => Arc::new(FixedGeolocator::new(Some(Coordinates::new(lat, lon)))),
                    None => Arc::new(PromptGeolocator),
                };
                let mut app = orchestrator(&config, geolocator)?;
                app.handle(UiEvent::UseLocation).await
            }
            Command::History { replay } => {
                let mut app = orchestrator(&config, Arc::new(PromptGeolocator))?;
                match replay {
                    Some(n) => {
                        let city = history_entry(&app, n)?;
                        app.handle(UiEvent::HistorySelected(city)).await
                    }
                    None => {
                        print_history(app.history());
                        SearchState::Idle
                    }
                }
            }
            Command::Suggest { text, pick } => {
                let mut app = orchestrator(&config, Arc::new(PromptGeolocator))?;
                suggest(&mut app, &text, pick).await?
            }
            Command::Interactive => {
                let mut app = orchestrator(&config, Arc::new(PromptGeolocator))?;
                interactive(&mut app).await?
            }
        };

        Ok(match state {
            SearchState::Errored => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        })
    }
}

fn orchestrator(config: &Config, geolocator: Arc<dyn Geolocator>) -> Result<TerminalOrchestrator> {
    let backend = RelayClient::new(&config.relay_url)
        .with_context(|| format!("Invalid relay URL '{}'", config.relay_url))?;
    let store = FileHistoryStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "history store");

    Ok(Orchestrator::new(
        Arc::new(backend),
        geolocator,
        SearchHistory::load(Box::new(store)),
        config.default_units,
        TerminalPresenter::stdout(),
    ))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    config.relay_url = Text::new("Relay URL:")
        .with_default(&config.relay_url)
        .with_help_message("Base URL of the weather relay service")
        .prompt()?;

    let current = Units::all()
        .iter()
        .position(|u| *u == config.default_units)
        .unwrap_or(0);
    config.default_units = Select::new("Default units:", Units::all().to_vec())
        .with_starting_cursor(current)
        .prompt()?;

    RelayClient::new(&config.relay_url).with_context(|| format!("Invalid relay URL '{}'", config.relay_url))?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn history_entry(app: &TerminalOrchestrator, n: usize) -> Result<String> {
    let entries = app.history();
    match n.checked_sub(1).and_then(|i| entries.get(i)) {
        Some(city) => Ok(city.clone()),
        None if entries.is_empty() => bail!("No recent searches."),
        None => bail!("No history entry {n}; choose 1 to {}.", entries.len()),
    }
}

fn print_history(entries: &[String]) {
    if entries.is_empty() {
        println!("No recent searches.");
        return;
    }
    for (i, city) in entries.iter().enumerate() {
        println!("{:>2}. {city}", i + 1);
    }
}

async fn suggest(app: &mut TerminalOrchestrator, text: &str, pick: bool) -> Result<SearchState> {
    let result = app.autocomplete().suggest(text).await;
    app.handle(UiEvent::SuggestionsReady(result)).await;

    let labels = app.presenter().suggestions().to_vec();
    if labels.is_empty() {
        println!("No matching places.");
        return Ok(app.state());
    }
    if !pick {
        return Ok(app.state());
    }

    let choice = skippable(Select::new("Show weather for:", labels).raw_prompt())?;
    Ok(match choice {
        Some(choice) => app.handle(UiEvent::SuggestionSelected(choice.index)).await,
        None => app.handle(UiEvent::DismissSuggestions).await,
    })
}

/// Treat a cancelled prompt as no answer.
fn skippable<T>(answer: Result<T, InquireError>) -> Result<Option<T>, InquireError> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn interactive(app: &mut TerminalOrchestrator) -> Result<SearchState> {
    println!("{REPL_HELP}");
    let mut state = app.handle(UiEvent::PageLoaded).await;

    loop {
        let last_query = app.presenter().query().to_string();
        let Some(line) = Text::new("City:").with_placeholder(&last_query).prompt_skippable()? else {
            break;
        };
        let line = line.trim();

        state = match line.split_once(' ').unwrap_or((line, "")) {
            (":q", _) => break,
            (":u", _) => app.handle(UiEvent::ToggleUnits).await,
            (":loc", _) => app.handle(UiEvent::UseLocation).await,
            (":h", "") => {
                print_history(app.presenter().history());
                state
            }
            (":h", n) => {
                let entry = n
                    .trim()
                    .parse::<usize>()
                    .map_err(anyhow::Error::from)
                    .and_then(|n| history_entry(app, n));
                match entry {
                    Ok(city) => app.handle(UiEvent::HistorySelected(city)).await,
                    Err(e) => {
                        println!("{e}");
                        state
                    }
                }
            }
            (":s", text) => suggest(app, text, true).await?,
            _ => app.handle(UiEvent::Submit(line.to_string())).await,
        };
        tracing::debug!(?state, "search finished");
    }

    Ok(state)
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
    fn global_overrides_parse_after_subcommand() {
        let cli = Cli::parse_from(["weather", "show", "Paris", "--units", "imperial", "--relay-url", "http://relay:8080"]);

        assert_eq!(cli.units, Some(Units::Imperial));
        assert_eq!(cli.relay_url.as_deref(), Some("http://relay:8080"));
        assert!(matches!(cli.command, Some(Command::Show { city: Some(ref c) }) if c == "Paris"));
    }

    #[test]
    fn here_accepts_negative_coordinates() {
        let cli = Cli::parse_from(["weather", "here", "--lat", "-33.86", "--lon", "151.2"]);

        assert!(matches!(cli.command, Some(Command::Here { lat: Some(lat), lon: Some(_) }) if lat < 0.0));
    }

    #[test]
    fn here_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["weather", "here", "--lat", "10"]).is_err());
    }

    #[test]
    fn unknown_units_are_rejected() {
        assert!(Cli::try_parse_from(["weather", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn cancelled_pick_is_no_choice() {
        assert_eq!(skippable(Ok(2)).unwrap(), Some(2));
        assert_eq!(skippable::<usize>(Err(InquireError::OperationCanceled)).unwrap(), None);
        assert!(matches!(
            skippable::<usize>(Err(InquireError::OperationInterrupted)),
            Err(InquireError::OperationInterrupted)
        ));
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::parse_from(["weather"]);
        assert!(cli.command.is_none());
    }
}
