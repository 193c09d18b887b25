//! The two-prompt configuration flow.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::{Config, ConfigStore};

pub const LOCATION_PROMPT: &str = "City. i.e. Shanghai,CN";
pub const API_KEY_PROMPT: &str = "API Key for OpenWeatherMap.org";

/// Asks the user for one line of text.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// `Ok(None)` when the user cancels. `Err` when no prompt could be shown
    /// at all, e.g. without a terminal.
    async fn prompt(&self, message: &str, initial: Option<&str>) -> Result<Option<String>>;
}

/// Ask for location, then API key, each pre-filled with the current value.
/// A cancelled prompt clears its field.
pub async fn prompt_config(prompter: &dyn Prompter, current: &Config) -> Result<Config> {
    let location = prompter
        .prompt(LOCATION_PROMPT, current.location())
        .await
        .context("Failed to prompt for location")?;

    let key = prompter
        .prompt(API_KEY_PROMPT, current.api_key())
        .await
        .context("Failed to prompt for API key")?;

    Ok(Config::new(location, key))
}

/// Run the prompts and persist the result.
pub async fn configure(
    prompter: &dyn Prompter,
    store: &dyn ConfigStore,
    current: &Config,
) -> Result<Config> {
    let config = prompt_config(prompter, current).await?;
    store.save(&config)?;
    Ok(config)
}
