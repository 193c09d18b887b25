use thiserror::Error;

/// Errors surfaced by the core. Both are expected at runtime and map to a
/// status line rather than terminating the block.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Location or API key is absent or empty.
    #[error("location and API key must both be configured")]
    ConfigurationIncomplete,

    /// Transport, status or payload failure. The reason is for logs only.
    #[error("weather unavailable: {0}")]
    FetchFailed(String),
}

impl WeatherError {
    /// Collapse an `anyhow` chain into a single fetch failure.
    pub fn fetch_failed(err: anyhow::Error) -> Self {
        WeatherError::FetchFailed(format!("{err:#}"))
    }
}
