use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::geocode::DEFAULT_NOMINATIM_URL;
use crate::language::Language;
use crate::strategy::DEFAULT_TEMPLATE_DELAY;

const DEFAULT_RELAY_URL: &str = "http://localhost:5000";
const DEFAULT_STATE_PATH: &str = "civicflow-state.json";

/// Client configuration loaded from environment variables.
/// Every key has a default; CLI flags override on top.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub state_path: PathBuf,
    pub language: Language,
    pub nominatim_url: String,
    pub template_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            language: Language::default(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            template_delay: DEFAULT_TEMPLATE_DELAY,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ClientConfig::default();
        let language = match optional_env("CIVICFLOW_LANGUAGE") {
            Some(raw) => raw.parse::<Language>().map_err(|e| anyhow!("CIVICFLOW_LANGUAGE: {e}"))?,
            None => defaults.language,
        };

        Ok(ClientConfig {
            relay_url: optional_env("CIVICFLOW_RELAY_URL").unwrap_or(defaults.relay_url),
            state_path: optional_env("CIVICFLOW_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            language,
            nominatim_url: optional_env("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            template_delay: defaults.template_delay,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.relay_url, "http://localhost:5000");
        assert_eq!(config.state_path, PathBuf::from("civicflow-state.json"));
        assert_eq!(config.language, Language::English);
        assert_eq!(config.template_delay, Duration::from_millis(1500));
    }
}
