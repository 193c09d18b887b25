use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::error::WeatherError;

/// Settings under the `[instant_weather]` namespace.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct WeatherSettings {
    /// City query, e.g. "Shanghai,CN".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// OpenWeatherMap API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for WeatherSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherSettings")
            .field("location", &self.location)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [instant_weather]
/// location = "Tokyo,JP"
/// key = "..."
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub instant_weather: WeatherSettings,
}

/// Empty or whitespace-only values count as absent.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn new(location: Option<String>, key: Option<String>) -> Self {
        let mut cfg = Self::default();
        cfg.set_location(location);
        cfg.set_api_key(key);
        cfg
    }

    pub fn location(&self) -> Option<&str> {
        self.instant_weather.location.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.instant_weather.key.as_deref()
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.instant_weather.location = normalize(location);
    }

    pub fn set_api_key(&mut self, key: Option<String>) {
        self.instant_weather.key = normalize(key);
    }

    /// Location and API key, or `ConfigurationIncomplete` if either is
    /// missing.
    pub fn credentials(&self) -> Result<(&str, &str), WeatherError> {
        match (self.location(), self.api_key()) {
            (Some(location), Some(key)) if !location.is_empty() && !key.is_empty() => {
                Ok((location, key))
            }
            _ => Err(WeatherError::ConfigurationIncomplete),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.credentials().is_ok()
    }
}

/// Persistence for [`Config`].
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn save(&self, config: &Config) -> Result<()>;
}

/// TOML file store, global per user.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Path to the default config file.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "instant-weather", "instant-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    fn load(&self) -> Result<Config> {
        let path = &self.path;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Hand-edited files may contain empty strings.
        Ok(Config::new(
            cfg.instant_weather.location,
            cfg.instant_weather.key,
        ))
    }

    /// Save config to disk, creating parent directories as needed.
    fn save(&self, config: &Config) -> Result<()> {
        let path = &self.path;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(config).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_incomplete() {
        let cfg = Config::default();
        assert!(!cfg.is_complete());
        assert!(matches!(
            cfg.credentials(),
            Err(WeatherError::ConfigurationIncomplete)
        ));
    }

    #[test]
    fn empty_api_key_is_incomplete() {
        let cfg = Config::new(Some("Tokyo,JP".into()), Some("   ".into()));
        assert_eq!(cfg.api_key(), None);
        assert!(!cfg.is_complete());
    }

    #[test]
    fn complete_config_yields_credentials() {
        let cfg = Config::new(Some(" Tokyo,JP ".into()), Some("abc123".into()));
        let (location, key) = cfg.credentials().expect("config must be complete");
        assert_eq!(location, "Tokyo,JP");
        assert_eq!(key, "abc123");
    }

    #[test]
    fn debug_output_redacts_key() {
        let cfg = Config::new(Some("Tokyo,JP".into()), Some("abc123".into()));
        let debug = format!("{cfg:?}");
        assert!(debug.contains("Tokyo,JP"));
        assert!(!debug.contains("abc123"));
    }

    #[test]
    fn missing_file_loads_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("nope").join("config.toml"));
        assert_eq!(store.load().unwrap(), Config::default());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("nested").join("config.toml"));

        let cfg = Config::new(Some("Tokyo,JP".into()), Some("abc123".into()));
        store.save(&cfg).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("[instant_weather]"));
        assert!(contents.contains("location = \"Tokyo,JP\""));
        assert!(contents.contains("key = \"abc123\""));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.location(), Some("Tokyo,JP"));
        assert_eq!(loaded.api_key(), Some("abc123"));
    }

    #[test]
    fn absent_fields_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.toml"));

        store.save(&Config::new(Some("Oslo,NO".into()), None)).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(!contents.contains("key"));
        assert_eq!(store.load().unwrap().api_key(), None);
    }

    #[test]
    fn load_normalizes_empty_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[instant_weather]\nlocation = \"\"\nkey = \"k\"\n").unwrap();

        let cfg = FileConfigStore::new(&path).load().unwrap();
        assert_eq!(cfg.location(), None);
        assert_eq!(cfg.api_key(), Some("k"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "instant_weather = [").unwrap();

        let err = FileConfigStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
