//! Service configuration.
//!
//! Compiled-in defaults, optionally overridden by a TOML file, then by
//! environment variables (loaded from `.env` when present). Every layer
//! is optional: a missing or unreadable config file just means defaults,
//! logged at warning level, never a startup failure.

use serde::Deserialize;

use crate::ingest::scb;
use crate::logging::{self, DataSource};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// PxWeb language segment: "en" or "sv".
    pub language: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    /// Default minimum volume for flow-map inclusion.
    pub min_flow: f64,
    /// Default ranking size.
    pub top_n: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            base_url: scb::SCB_BASE_URL.to_string(),
            timeout_secs: scb::DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: 6 * 3600,
            min_flow: 100.0,
            top_n: 10,
        }
    }
}

/// File shape: every field optional so a partial config overrides only
/// what it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    language: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    cache_ttl_secs: Option<u64>,
    min_flow: Option<f64>,
    top_n: Option<usize>,
}

impl ServiceConfig {
    /// Parse a TOML document over the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(raw)?;
        let mut config = Self::default();
        if let Some(v) = file.language {
            config.language = v;
        }
        if let Some(v) = file.base_url {
            config.base_url = v;
        }
        if let Some(v) = file.timeout_secs {
            config.timeout_secs = v;
        }
        if let Some(v) = file.cache_ttl_secs {
            config.cache_ttl_secs = v;
        }
        if let Some(v) = file.min_flow {
            config.min_flow = v;
        }
        if let Some(v) = file.top_n {
            config.top_n = v;
        }
        Ok(config)
    }

    /// Load configuration: defaults, then `path` (when given and
    /// readable), then `SCB_*` environment variables, with `.env`
    /// loaded first so local overrides work without exporting.
    pub fn load(path: Option<&str>) -> Self {
        dotenv::dotenv().ok();

        let mut config = match path.map(std::fs::read_to_string) {
            Some(Ok(raw)) => match Self::from_toml_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    logging::warn(
                        DataSource::System,
                        None,
                        &format!("malformed config file, using defaults: {}", e),
                    );
                    Self::default()
                }
            },
            Some(Err(e)) => {
                logging::warn(
                    DataSource::System,
                    None,
                    &format!("config file unreadable, using defaults: {}", e),
                );
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("SCB_LANGUAGE") {
            self.language = v;
        }
        if let Ok(v) = std::env::var("SCB_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = std::env::var("SCB_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.timeout_secs = n,
                Err(_) => logging::warn(
                    DataSource::System,
                    None,
                    &format!("ignoring non-numeric SCB_TIMEOUT_SECS: {}", v),
                ),
            }
        }
        if let Ok(v) = std::env::var("SCB_CACHE_TTL_SECS") {
            match v.parse() {
                Ok(n) => self.cache_ttl_secs = n,
                Err(_) => logging::warn(
                    DataSource::System,
                    None,
                    &format!("ignoring non-numeric SCB_CACHE_TTL_SECS: {}", v),
                ),
            }
        }
        if let Ok(v) = std::env::var("SCB_MIN_FLOW") {
            match v.parse() {
                Ok(n) => self.min_flow = n,
                Err(_) => logging::warn(
                    DataSource::System,
                    None,
                    &format!("ignoring non-numeric SCB_MIN_FLOW: {}", v),
                ),
            }
        }
        if let Ok(v) = std::env::var("SCB_TOP_N") {
            match v.parse() {
                Ok(n) => self.top_n = n,
                Err(_) => logging::warn(
                    DataSource::System,
                    None,
                    &format!("ignoring non-numeric SCB_TOP_N: {}", v),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_scb() {
        let config = ServiceConfig::default();
        assert_eq!(config.language, "en");
        assert!(config.base_url.contains("api.scb.se"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let config = ServiceConfig::from_toml_str(
            r#"
            language = "sv"
            cache_ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.language, "sv");
        assert_eq!(config.cache_ttl_secs, 60);
        // Untouched fields keep their defaults.
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.min_flow, 100.0);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(ServiceConfig::from_toml_str("language = [").is_err());
    }

    #[test]
    fn test_env_layer_covers_every_tunable() {
        // set_var is unsafe since edition 2024; this is the only test
        // touching the process environment.
        unsafe {
            std::env::set_var("SCB_LANGUAGE", "sv");
            std::env::set_var("SCB_TIMEOUT_SECS", "15");
            std::env::set_var("SCB_MIN_FLOW", "250.5");
            std::env::set_var("SCB_TOP_N", "5");
        }
        let mut config = ServiceConfig::default();
        config.apply_env();
        unsafe {
            std::env::remove_var("SCB_LANGUAGE");
            std::env::remove_var("SCB_TIMEOUT_SECS");
            std::env::remove_var("SCB_MIN_FLOW");
            std::env::remove_var("SCB_TOP_N");
        }
        assert_eq!(config.language, "sv");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.min_flow, 250.5);
        assert_eq!(config.top_n, 5);
    }
}
