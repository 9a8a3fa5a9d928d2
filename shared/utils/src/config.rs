use config::{Config, ConfigError, Environment, File};
#[cfg(test)]
use config::Map;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pdb_api: PdbApiConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdbApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Structure cache settings. Capacity and TTL are kept signed and
/// fractional here so that out-of-range values reach the cache constructor
/// and fail there with a configuration error instead of being coerced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_size: i64,
    pub ttl_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    /// Loads defaults, optional config files and `PDBCTX__*` environment
    /// variables. A value that cannot be parsed is an error, never a default.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::load_from(Self::environment())
    }

    // e.g. PDBCTX__CACHE__MAX_SIZE=500
    fn environment() -> Environment {
        Environment::with_prefix("PDBCTX")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_from(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment);

        config.build()?.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                timeout_seconds: 30,
            },
            pdb_api: PdbApiConfig {
                base_url: "https://data.rcsb.org".to_string(),
                timeout_seconds: 10,
            },
            cache: CacheConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_size: 1000,
            ttl_seconds: 3600.0, // 1 hour
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_config_builder() {
        let defaults = Config::try_from(&AppConfig::default()).unwrap();
        let loaded: AppConfig = Config::builder()
            .add_source(defaults)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.server.port, 8000);
        assert_eq!(loaded.pdb_api.timeout_seconds, 10);
        assert_eq!(loaded.cache.max_size, 1000);
        assert_eq!(loaded.cache.ttl_seconds, 3600.0);
        assert_eq!(loaded.logging.format, "json");
    }

    fn environment_with(vars: &[(&str, &str)]) -> Environment {
        let vars: Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::environment().source(Some(vars))
    }

    #[test]
    fn test_environment_overrides_cache_settings() {
        let config = AppConfig::load_from(environment_with(&[
            ("PDBCTX__CACHE__ENABLED", "true"),
            ("PDBCTX__CACHE__MAX_SIZE", "500"),
            ("PDBCTX__CACHE__TTL_SECONDS", "90.5"),
        ]))
        .unwrap();

        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_size, 500);
        assert_eq!(config.cache.ttl_seconds, 90.5);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_non_numeric_cache_settings_fail_to_load() {
        let result = AppConfig::load_from(environment_with(&[("PDBCTX__CACHE__MAX_SIZE", "abc")]));
        assert!(result.is_err());

        let result =
            AppConfig::load_from(environment_with(&[("PDBCTX__CACHE__TTL_SECONDS", "soon")]));
        assert!(result.is_err());
    }
}
