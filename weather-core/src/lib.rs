//! Core library for the `instant-weather` status block.
//!
//! This crate defines:
//! - Configuration storage and the interactive configuration flow
//! - The OpenWeatherMap client
//! - The display state machine and status rendering
//! - The refresh scheduler driving it all
//!
//! It is used by `instant-weather`, but the scheduler only talks to traits, so
//! other front ends can plug in their own presenter and prompts.

pub mod config;
pub mod configure;
pub mod display;
pub mod error;
pub mod model;
pub mod provider;
pub mod scheduler;
pub mod session;

pub use config::{Config, ConfigStore, FileConfigStore};
pub use configure::Prompter;
pub use error::WeatherError;
pub use model::{DisplayMode, Status, StatusKind, WeatherSnapshot};
pub use provider::{OpenWeatherClient, WeatherClient};
pub use scheduler::{Command, Scheduler, StatusPresenter};
pub use session::Session;
