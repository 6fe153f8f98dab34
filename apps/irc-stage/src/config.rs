//! # Server Configuration
//!
//! Defaults, overridden by environment variables, overridden by CLI flags.
//!
//! | variable          | default                               |
//! |-------------------|---------------------------------------|
//! | `IRC_HOST`        | `0.0.0.0`                             |
//! | `IRC_PORT`        | `8000`                                |
//! | `IRC_MODEL_PATH`  | `models/irc_gradient_boosting.json`   |
//! | `IRC_CORS_ORIGIN` | any origin                            |

use std::path::PathBuf;
use tracing::warn;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default model artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "models/irc_gradient_boosting.json";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    /// Allowed CORS origin. `None` or `"*"` allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("IRC_HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup("IRC_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid IRC_PORT"),
            }
        }
        if let Some(path) = lookup("IRC_MODEL_PATH").filter(|p| !p.is_empty()) {
            config.model_path = PathBuf::from(path);
        }
        config.cors_origin = lookup("IRC_CORS_ORIGIN").filter(|o| !o.is_empty());

        config
    }

    /// `host:port` for logging.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("IRC_HOST", "127.0.0.1"),
            ("IRC_PORT", "9100"),
            ("IRC_MODEL_PATH", "/srv/model.json"),
            ("IRC_CORS_ORIGIN", "https://clinic.example"),
        ]));
        assert_eq!(config.address(), "127.0.0.1:9100");
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(
            config.cors_origin.as_deref(),
            Some("https://clinic.example")
        );
    }

    #[test]
    fn test_invalid_port_keeps_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[("IRC_PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
