//! Display state machine: current mode, latest snapshot, configuration.

use log::{debug, info, warn};

use crate::{
    config::Config,
    display,
    error::WeatherError,
    model::{DisplayMode, Status, WeatherSnapshot},
};

/// Credentials for one fetch, tagged with its sequence number.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub location: String,
    pub api_key: String,
}

impl std::fmt::Debug for FetchTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchTicket")
            .field("seq", &self.seq)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Result of the switch-mode command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Mode advanced; show this.
    Switched(Status),
    /// Location or key missing; open the configuration flow.
    NeedsConfiguration,
    /// Nothing fetched yet, nothing to cycle.
    NoSnapshot,
}

/// All mutable state of a running block.
#[derive(Debug, Default)]
pub struct Session {
    mode: DisplayMode,
    snapshot: Option<WeatherSnapshot>,
    config: Config,
    /// Last sequence number handed out.
    issued: u64,
    /// Responses at or below this are stale.
    applied: u64,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Status derived from mode, snapshot and configuration presence alone.
    pub fn status(&self) -> Status {
        if !self.config.is_complete() {
            return display::unconfigured();
        }
        match &self.snapshot {
            Some(snapshot) => display::render(self.mode, snapshot),
            None => display::unavailable(),
        }
    }

    /// Status to show before the first fetch, if any.
    pub fn startup_status(&self) -> Option<Status> {
        (!self.config.is_complete()).then(display::unconfigured)
    }

    /// Start a fetch-and-render cycle. Fails without side effects when the
    /// configuration is incomplete.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, WeatherError> {
        let (location, api_key) = self.config.credentials()?;
        let ticket = FetchTicket {
            seq: self.issued + 1,
            location: location.to_string(),
            api_key: api_key.to_string(),
        };
        self.issued = ticket.seq;
        debug!("Starting fetch #{} for {}", ticket.seq, ticket.location);
        Ok(ticket)
    }

    /// Apply a fetch result. Returns the status to show, or `None` when a
    /// newer response has already been applied.
    pub fn complete_fetch(
        &mut self,
        seq: u64,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> Option<Status> {
        if seq <= self.applied {
            warn!(
                "Discarding stale fetch #{seq} (already applied #{})",
                self.applied
            );
            return None;
        }
        self.applied = seq;

        match result {
            Ok(snapshot) => {
                debug!(
                    "Fetch #{seq} succeeded: {}, {} at {}",
                    snapshot.location_name, snapshot.country, snapshot.fetched_at
                );
                self.snapshot = Some(snapshot);
            }
            Err(err) => {
                warn!("Fetch #{seq} failed: {err}");
                self.snapshot = None;
            }
        }
        Some(self.status())
    }

    /// Advance the display mode.
    pub fn switch_mode(&mut self) -> SwitchOutcome {
        if !self.config.is_complete() {
            return SwitchOutcome::NeedsConfiguration;
        }
        if self.snapshot.is_none() {
            return SwitchOutcome::NoSnapshot;
        }

        self.mode = self.mode.next();
        info!("Display mode: {}", self.mode);
        SwitchOutcome::Switched(self.status())
    }

    /// Replace the configuration. Fetches in flight were issued for the old
    /// configuration and are discarded when they land.
    pub fn apply_config(&mut self, config: Config) {
        self.config = config;
        self.applied = self.issued;
    }
}
