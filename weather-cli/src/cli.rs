use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use chrono::{DateTime, Local, TimeZone};
use instant_weather_core::{
    Config, ConfigStore, DisplayMode, FileConfigStore, OpenWeatherClient, Scheduler,
    WeatherClient, configure, display, scheduler::REFRESH_INTERVAL,
};
use log::{LevelFilter, info, warn};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::mpsc;

use crate::{
    input::{self, LinePrompter, StdinRouter},
    presenter::{OutputFormat, StdoutPresenter},
    prompt::InquirePrompter,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "instant-weather",
    version,
    about = "Current weather for your status bar"
)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the status block: print a status line on every update, read
    /// `switch` / `configure` commands from stdin.
    Run {
        /// Status line format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Seconds between refreshes.
        #[arg(long, default_value_t = REFRESH_INTERVAL.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// Set location and API key interactively.
    Configure,

    /// Fetch once and print the status text and tooltip.
    Show {
        /// What to show.
        #[arg(long, default_value = "temperature", value_parser = parse_mode)]
        mode: DisplayMode,
    },
}

fn parse_mode(s: &str) -> Result<DisplayMode, String> {
    DisplayMode::try_from(s).map_err(|err| err.to_string())
}

impl Cli {
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        // RUST_LOG, when set, wins over the flag.
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
    }

    fn store(&self) -> anyhow::Result<FileConfigStore> {
        match &self.config {
            Some(path) => Ok(FileConfigStore::new(path)),
            None => FileConfigStore::at_default_location(),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let store = self.store()?;
        let command = self.command.unwrap_or(Command::Run {
            format: OutputFormat::Json,
            interval: REFRESH_INTERVAL.as_secs(),
        });
        let config = load_config(&store, &command)?;

        match command {
            Command::Run { format, interval } => {
                let (tx, rx) = mpsc::channel(16);
                // stdin is both the command stream and the prompt input.
                let router = Arc::new(StdinRouter::default());
                input::spawn_stdin(tx.clone(), Arc::clone(&router));
                #[cfg(unix)]
                input::spawn_signals(tx)?;

                Scheduler::new(
                    config,
                    Arc::new(OpenWeatherClient::new()),
                    Arc::new(store),
                    Arc::new(LinePrompter::new(router)),
                    StdoutPresenter::new(std::io::stdout(), format),
                )
                .with_interval(Duration::from_secs(interval))
                .run(rx)
                .await
            }
            Command::Configure => {
                let saved = configure::configure(&InquirePrompter, &store, &config).await?;
                if saved.is_complete() {
                    println!("Saved configuration to {}", store.path().display());
                } else {
                    println!(
                        "Saved incomplete configuration to {}; weather stays off until both location and API key are set.",
                        store.path().display()
                    );
                }
                Ok(())
            }
            Command::Show { mode } => {
                let (location, api_key) = config.credentials().map_err(|_| {
                    anyhow!(
                        "Location and API key are not configured.\n\
                         Hint: run `instant-weather configure` first."
                    )
                })?;

                info!("Fetching current weather for {location}");
                let snapshot = OpenWeatherClient::new()
                    .fetch(location, api_key)
                    .await
                    .context("Could not fetch current weather")?;

                let status = display::render(mode, &snapshot);
                println!("{}", status.text);
                println!("{}", status.tooltip);
                println!("{}", updated_line(snapshot.fetched_at.with_timezone(&Local)));
                Ok(())
            }
        }
    }
}

fn updated_line<Tz: TimeZone>(at: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Updated {}", at.format("%Y-%m-%d %H:%M:%S"))
}

/// Load the stored config. `configure` tolerates a broken file, since it is
/// the way to repair it.
fn load_config(store: &dyn ConfigStore, command: &Command) -> anyhow::Result<Config> {
    match (store.load(), command) {
        (Ok(config), _) => Ok(config),
        (Err(err), Command::Configure) => {
            warn!("Ignoring unreadable configuration: {err:#}");
            Ok(Config::default())
        }
        (Err(err), _) => Err(err),
    }
}
