//! Backend endpoint configuration

use super::Route;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_GENERAL_PATH: &str = "/chat";
pub const DEFAULT_CONSTRAINED_PATH: &str = "/feedback";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds greater than zero, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}

/// Where the dialogue backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub general_path: String,
    pub constrained_path: String,
    /// Upper bound on one request, enforced by the HTTP client
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            general_path: DEFAULT_GENERAL_PATH.to_string(),
            constrained_path: DEFAULT_CONSTRAINED_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// Read `CHAT_BACKEND_URL`, `CHAT_GENERAL_PATH`, `CHAT_CONSTRAINED_PATH`
    /// and `CHAT_TIMEOUT_SECS`, falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BackendConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = match lookup("CHAT_BACKEND_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url,
            Some(url) => {
                return Err(ConfigError::InvalidUrl {
                    var: "CHAT_BACKEND_URL",
                    value: url,
                })
            }
            None => defaults.base_url,
        };

        let timeout = match lookup("CHAT_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: "CHAT_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => defaults.timeout,
        };

        Ok(Self {
            base_url,
            general_path: lookup("CHAT_GENERAL_PATH").unwrap_or(defaults.general_path),
            constrained_path: lookup("CHAT_CONSTRAINED_PATH")
                .unwrap_or(defaults.constrained_path),
            timeout,
        })
    }

    /// Full URL for a route
    pub fn endpoint(&self, route: Route) -> String {
        let path = match route {
            Route::General => &self.general_path,
            Route::ConstrainedReply => &self.constrained_path,
        };
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
