//! Dashboard configuration.
//!
//! Values are resolved in order: built-in defaults, an optional TOML file,
//! then the `METROVIA_API_URL` environment variable. Command-line flags are
//! applied on top by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default API base URL (local development server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "metrovia.toml";

/// Environment variable that overrides [`Config::base_url`].
pub const API_URL_ENV: &str = "METROVIA_API_URL";

/// Errors loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`Config`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Resolved dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API base URL every endpoint path is appended to.
    pub base_url: String,
    /// Years offered by the report page's trend selector.
    pub report_years: Vec<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            report_years: vec![2023, 2024, 2025],
        }
    }
}

impl Config {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`]
    /// is read if present. The environment override is applied last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::debug!("Reading {}", default_path.display());
                    Self::from_toml_str(&std::fs::read_to_string(default_path)?)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Applies environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
        self
    }

    /// Overrides the base URL when `url` is given.
    #[must_use]
    pub fn with_base_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.base_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = Config::from_toml_str(
            r#"
base_url = "http://incidencias.internal/api/v1"
report_years = [2024, 2025, 2026]
"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://incidencias.internal/api/v1");
        assert_eq!(config.report_years, vec![2024, 2025, 2026]);
    }

    #[test]
    fn env_then_flag_take_precedence() {
        let config = Config::default().with_env(|key| {
            (key == API_URL_ENV).then(|| "http://from-env/api".to_string())
        });
        assert_eq!(config.base_url, "http://from-env/api");

        let config = config.with_base_url(Some("http://from-flag/api".to_string()));
        assert_eq!(config.base_url, "http://from-flag/api");
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let config = Config::default().with_env(|_| Some(String::new()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(Config::from_toml_str("base_url = [").is_err());
    }
}
