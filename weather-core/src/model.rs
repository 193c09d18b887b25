use chrono::{DateTime, Utc};
use serde::Serialize;

/// Current conditions from one successful fetch. Replaced wholesale by the
/// next fetch, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub description: String,
    pub icon: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub wind_deg: f64,
    pub location_name: String,
    pub country: String,
    pub fetched_at: DateTime<Utc>,
}

/// Which facet of the snapshot the status line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    #[default]
    Temperature,
    Humidity,
    Wind,
    Location,
}

impl DisplayMode {
    pub const fn all() -> &'static [DisplayMode] {
        &[
            DisplayMode::Temperature,
            DisplayMode::Humidity,
            DisplayMode::Wind,
            DisplayMode::Location,
        ]
    }

    /// Next mode in cyclic order, wrapping after `Location`.
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Temperature => DisplayMode::Humidity,
            DisplayMode::Humidity => DisplayMode::Wind,
            DisplayMode::Wind => DisplayMode::Location,
            DisplayMode::Location => DisplayMode::Temperature,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Temperature => "temperature",
            DisplayMode::Humidity => "humidity",
            DisplayMode::Wind => "wind",
            DisplayMode::Location => "location",
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DisplayMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        DisplayMode::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown display mode '{value}'. Supported modes: temperature, humidity, wind, location."
                )
            })
    }
}

/// The three states the indicator can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Weather,
    Unavailable,
    Unconfigured,
}

/// What the presenter shows: one line of text plus a hover tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub text: String,
    pub tooltip: String,
    #[serde(rename = "class")]
    pub kind: StatusKind,
}
