//! Event loop driving a [`Session`]: periodic refresh, user commands, and
//! the results of spawned fetches and prompt flows.

use anyhow::Result;
use log::{debug, error, info, warn};
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

use crate::{
    config::{Config, ConfigStore},
    configure::{self, Prompter},
    display,
    error::WeatherError,
    model::{Status, WeatherSnapshot},
    provider::WeatherClient,
    session::{FetchTicket, Session, SwitchOutcome},
};

/// Refresh period of the status block.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Where status updates go, e.g. a status bar.
pub trait StatusPresenter: Send {
    fn show(&mut self, status: &Status) -> Result<()>;
}

/// User commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Cycle the display mode, or configure if unset.
    SwitchMode,
    /// Always open the configuration prompts.
    UpdateConfiguration,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "switch" | "click" => Ok(Command::SwitchMode),
            "configure" => Ok(Command::UpdateConfiguration),
            other => Err(anyhow::anyhow!(
                "Unknown command '{other}'. Supported commands: switch, configure."
            )),
        }
    }
}

/// Results coming back from spawned tasks.
enum Event {
    Fetched {
        seq: u64,
        result: Result<WeatherSnapshot, WeatherError>,
    },
    Configured(Result<Config>),
}

/// Owns the session and every collaborator.
pub struct Scheduler<P> {
    session: Session,
    client: Arc<dyn WeatherClient>,
    store: Arc<dyn ConfigStore>,
    prompter: Arc<dyn Prompter>,
    presenter: P,
    interval: Duration,
    configuring: bool,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl<P: StatusPresenter> Scheduler<P> {
    pub fn new(
        config: Config,
        client: Arc<dyn WeatherClient>,
        store: Arc<dyn ConfigStore>,
        prompter: Arc<dyn Prompter>,
        presenter: P,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(config),
            client,
            store,
            prompter,
            presenter,
            interval: REFRESH_INTERVAL,
            configuring: false,
            events_tx,
            events_rx,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until presenting fails. A closed command channel only stops
    /// command handling.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Result<()> {
        info!(
            "Starting weather block, refreshing every {}s",
            self.interval.as_secs()
        );

        if let Some(status) = self.session.startup_status() {
            self.presenter.show(&status)?;
        }

        // The first tick fires immediately and doubles as the startup fetch.
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.on_command(command)?,
                    None => {
                        info!("Command input closed");
                        commands_open = false;
                    }
                },
                Some(event) = self.events_rx.recv() => self.on_event(event)?,
            }
        }
    }

    fn on_tick(&mut self) {
        match self.session.begin_fetch() {
            Ok(ticket) => self.spawn_fetch(ticket),
            // Every path that leaves the config incomplete already shows
            // the unconfigured status.
            Err(_) => debug!("Skipping refresh, configuration incomplete"),
        }
    }

    fn on_command(&mut self, command: Command) -> Result<()> {
        debug!("Command: {command:?}");
        match command {
            Command::SwitchMode => match self.session.switch_mode() {
                SwitchOutcome::Switched(status) => self.presenter.show(&status)?,
                SwitchOutcome::NeedsConfiguration => self.spawn_configure(),
                SwitchOutcome::NoSnapshot => debug!("No weather yet, ignoring switch"),
            },
            Command::UpdateConfiguration => self.spawn_configure(),
        }
        Ok(())
    }

    fn on_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Fetched { seq, result } => {
                if let Some(status) = self.session.complete_fetch(seq, result) {
                    self.presenter.show(&status)?;
                }
            }
            Event::Configured(result) => {
                self.configuring = false;
                match result {
                    Ok(config) => self.apply_config(config)?,
                    Err(err) => warn!("Configuration aborted, keeping previous settings: {err:#}"),
                }
            }
        }
        Ok(())
    }

    fn apply_config(&mut self, config: Config) -> Result<()> {
        if let Err(err) = self.store.save(&config) {
            error!("Failed to save configuration: {err:#}");
        }
        self.session.apply_config(config);

        match self.session.begin_fetch() {
            Ok(ticket) => self.spawn_fetch(ticket),
            Err(_) => self.presenter.show(&display::unconfigured())?,
        }
        Ok(())
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch(&ticket.location, &ticket.api_key).await;
            // The receiver only goes away when the loop has ended.
            let _ = tx.send(Event::Fetched {
                seq: ticket.seq,
                result,
            });
        });
    }

    fn spawn_configure(&mut self) {
        if self.configuring {
            warn!("Configuration prompts already open");
            return;
        }
        self.configuring = true;

        let prompter = Arc::clone(&self.prompter);
        let current = self.session.config().clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = configure::prompt_config(prompter.as_ref(), &current).await;
            let _ = tx.send(Event::Configured(result));
        });
    }
}
