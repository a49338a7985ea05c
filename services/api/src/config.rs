//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
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
    pub bind_address: SocketAddr,
    pub analysis_url: String,
    pub storage_dir: PathBuf,
    pub log_level: Level,
    pub analysis_timeout: Duration,
    pub auth_latency: Duration,
    pub mock_analysis: bool,
    pub allowed_origin: String,
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
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:5000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;
        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:8080");

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Client Settings ---
        let analysis_url = var_or("ANALYSIS_URL", "http://127.0.0.1:5000/api/analyze");
        if !(analysis_url.starts_with("http://") || analysis_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "ANALYSIS_URL".to_string(),
                format!("'{}' is not an http(s) URL", analysis_url),
            ));
        }
        let storage_dir = PathBuf::from(var_or("STORAGE_DIR", "./.dermascan"));

        let analysis_timeout =
            Duration::from_secs(parse_number(&lookup, "ANALYSIS_TIMEOUT_SECS", 30)?);
        let auth_latency = Duration::from_millis(parse_number(&lookup, "AUTH_LATENCY_MS", 1000)?);

        let mock_analysis = match lookup("MOCK_ANALYSIS").as_deref().map(str::trim) {
            None | Some("") => false,
            Some(value) => parse_flag(value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MOCK_ANALYSIS".to_string(),
                    format!("'{}' is not a boolean", value),
                )
            })?,
        };

        Ok(Self {
            bind_address,
            analysis_url,
            storage_dir,
            log_level,
            analysis_timeout,
            auth_latency,
            mock_analysis,
            allowed_origin,
        })
    }
}

fn parse_number<F>(lookup: &F, name: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 5000);
        assert_eq!(config.analysis_url, "http://127.0.0.1:5000/api/analyze");
        assert_eq!(config.storage_dir, PathBuf::from("./.dermascan"));
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.analysis_timeout, Duration::from_secs(30));
        assert_eq!(config.auth_latency, Duration::from_millis(1000));
        assert!(!config.mock_analysis);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("BIND_ADDRESS", "127.0.0.1:9000"),
            ("RUST_LOG", "debug"),
            ("AUTH_LATENCY_MS", "0"),
            ("MOCK_ANALYSIS", "yes"),
            ("STORAGE_DIR", "/tmp/derma"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.log_level, Level::DEBUG);
        assert!(config.auth_latency.is_zero());
        assert!(config.mock_analysis);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/derma"));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("ANALYSIS_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "ANALYSIS_TIMEOUT_SECS"));

        let err = load(&[("MOCK_ANALYSIS", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "MOCK_ANALYSIS"));

        let err = load(&[("ANALYSIS_URL", "ftp://host/analyze")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "ANALYSIS_URL"));
    }
}
