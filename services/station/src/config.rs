//! services/station/src/config.rs
//!
//! Defines the station's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the property-management server (laundry, CEP and guest APIs).
    pub api_base_url: String,
    /// Local durable copy of the counter state.
    pub state_path: PathBuf,
    pub log_level: Level,
    pub registration_prompt_delay: Duration,
    pub mirror_shutdown_grace: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("LAUNDRY_API_BASE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "LAUNDRY_API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let state_path = lookup("LAUNDRY_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./laundry-counter.json"));

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let registration_prompt_delay =
            millis(&lookup, "REGISTRATION_PROMPT_DELAY_MS", 200)?;
        let mirror_shutdown_grace = millis(&lookup, "MIRROR_SHUTDOWN_GRACE_MS", 3000)?;

        Ok(Self {
            api_base_url,
            state_path,
            log_level,
            registration_prompt_delay,
            mirror_shutdown_grace,
        })
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(Duration::from_millis(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.state_path, PathBuf::from("./laundry-counter.json"));
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.registration_prompt_delay, Duration::from_millis(200));
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let config = config_from(&[("LAUNDRY_API_BASE_URL", "https://pms.local/")]).unwrap();
        assert_eq!(config.api_base_url, "https://pms.local");
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            config_from(&[("RUST_LOG", "loud")]),
            Err(ConfigError::InvalidValue(key, _)) if key == "RUST_LOG"
        ));
        assert!(matches!(
            config_from(&[("REGISTRATION_PROMPT_DELAY_MS", "soon")]),
            Err(ConfigError::InvalidValue(key, _)) if key == "REGISTRATION_PROMPT_DELAY_MS"
        ));
        assert!(matches!(
            config_from(&[("LAUNDRY_API_BASE_URL", "pms.local")]),
            Err(ConfigError::InvalidValue(..))
        ));
    }
}
