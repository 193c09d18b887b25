use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::WeatherError, model::WeatherSnapshot};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of current weather for one location.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    /// One fetch, no retries. Every failure is `WeatherError::FetchFailed`.
    async fn fetch(&self, location: &str, api_key: &str) -> Result<WeatherSnapshot, WeatherError>;
}
