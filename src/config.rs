//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BRACKET_VOTE_BACK_CONFIG_PATH";
/// Name shown for voters whose identity cannot be resolved.
const DEFAULT_UNKNOWN_VOTER_NAME: &str = "empty";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    unknown_voter_name: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Override the placeholder used for unresolvable voters.
    pub fn with_unknown_voter_name(mut self, name: impl Into<String>) -> Self {
        self.unknown_voter_name = name.into();
        self
    }

    /// Placeholder display name for voters missing from the profile lookup.
    pub fn unknown_voter_name(&self) -> &str {
        &self.unknown_voter_name
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            unknown_voter_name: DEFAULT_UNKNOWN_VOTER_NAME.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    unknown_voter_name: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let unknown_voter_name = value
            .unknown_voter_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UNKNOWN_VOTER_NAME.into());
        Self { unknown_voter_name }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_placeholder_falls_back_to_default() {
        let raw: RawConfig = serde_json::from_str(r#"{"unknown_voter_name": "  "}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.unknown_voter_name(), DEFAULT_UNKNOWN_VOTER_NAME);
    }

    #[test]
    fn placeholder_is_read_from_file_contents() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"unknown_voter_name": "Anonymous"}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.unknown_voter_name(), "Anonymous");
    }
}
