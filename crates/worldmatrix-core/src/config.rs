use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Measurement unit preference, applied to both remote requests and the
/// fallback model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Wire name, also used as the remote weather API's `units` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API credentials
    #[serde(default)]
    pub credentials: CredentialConfig,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Measurement units
    #[serde(default)]
    pub units: UnitSystem,

    /// Watch-mode settings
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Remote weather API key. When absent the network tier is skipped
    /// and weather falls back to local synthesis.
    #[serde(default)]
    pub weather_api_key: Option<String>,

    /// Remote time API key. The time API works without one; when present
    /// it is forwarded with each request.
    #[serde(default)]
    pub time_api_key: Option<String>,
}

impl CredentialConfig {
    /// Seed credentials from the environment (used on first run).
    pub fn from_env() -> Self {
        Self {
            weather_api_key: env_non_empty("OPENWEATHER_API_KEY"),
            time_api_key: env_non_empty("WORLDTIMEAPI_KEY"),
        }
    }

    /// Weather credential, treating an empty string as unconfigured.
    pub fn weather_key(&self) -> Option<&str> {
        self.weather_api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Time credential, treating an empty string as unconfigured.
    pub fn time_key(&self) -> Option<&str> {
        self.time_api_key.as_deref().filter(|k| !k.is_empty())
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age in seconds for which a cached record is served without
    /// re-acquisition.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Refresh interval in seconds for `--watch` mode.
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

fn default_refresh_seconds() -> u64 {
    300
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: CredentialConfig::from_env(),
            cache: CacheConfig::default(),
            units: UnitSystem::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors;
    /// warnings are logged and the config is returned.
    pub fn load_validated() -> Result<Self> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.cache.ttl_seconds == 0 {
            result.add_warning("cache.ttl_seconds", "Caching disabled (0 seconds)");
        } else if self.cache.ttl_seconds > 86_400 {
            result.add_warning(
                "cache.ttl_seconds",
                "Cache TTL is longer than a day; records will go very stale",
            );
        }

        if self.watch.refresh_seconds == 0 {
            result.add_error(
                "watch.refresh_seconds",
                "Refresh interval must be greater than 0",
            );
        } else if self.watch.refresh_seconds < 2 {
            result.add_warning(
                "watch.refresh_seconds",
                "Refresh interval below 2 seconds hammers the remote APIs",
            );
        }

        if self.credentials.weather_key().is_none() {
            result.add_warning(
                "credentials.weather_api_key",
                "No weather API key configured - weather will be synthesized locally",
            );
        }

        result
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("worldmatrix");

        Ok(config_dir.join("config.toml"))
    }

    /// Get the path to the cache database
    pub fn cache_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .context("Failed to get data directory")?
            .join("worldmatrix");

        Ok(data_dir.join("cache.db"))
    }

    /// Credential rendered for display: masked, keeping the last four
    /// characters.
    pub fn masked_key(key: Option<&str>) -> String {
        match key {
            Some(k) if k.len() > 4 => format!("********{}", &k[k.len() - 4..]),
            Some(_) => "********".to_string(),
            None => "(not set)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config {
            credentials: CredentialConfig::default(),
            ..Config::default()
        };
        let result = config.validate();
        assert!(
            result.is_valid(),
            "Default config should be valid: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_zero_refresh_is_error() {
        let mut config = Config::default();
        config.watch.refresh_seconds = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "watch.refresh_seconds"));
    }

    #[test]
    fn test_zero_ttl_is_warning_only() {
        let mut config = Config::default();
        config.credentials = CredentialConfig::default();
        config.cache.ttl_seconds = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "cache.ttl_seconds"));
    }

    #[test]
    fn test_missing_weather_key_is_warning() {
        let config = Config {
            credentials: CredentialConfig::default(),
            ..Config::default()
        };
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "credentials.weather_api_key"));
    }

    #[test]
    fn test_empty_credential_is_unconfigured() {
        let creds = CredentialConfig {
            weather_api_key: Some(String::new()),
            time_api_key: Some("abc123".to_string()),
        };
        assert_eq!(creds.weather_key(), None);
        assert_eq!(creds.time_key(), Some("abc123"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.credentials.weather_api_key = Some("key-1234".to_string());
        config.units = UnitSystem::Imperial;
        config.cache.ttl_seconds = 42;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.credentials.weather_key(), Some("key-1234"));
        assert_eq!(parsed.units, UnitSystem::Imperial);
        assert_eq!(parsed.cache.ttl_seconds, 42);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: Config = toml::from_str("[cache]\nttl_seconds = 30\n").unwrap();
        assert_eq!(parsed.cache.ttl_seconds, 30);
        assert_eq!(parsed.units, UnitSystem::Metric);
        assert_eq!(parsed.watch.refresh_seconds, 300);
    }

    #[test]
    fn test_unit_system_wire_names() {
        assert_eq!(UnitSystem::Metric.as_str(), "metric");
        assert_eq!(UnitSystem::Imperial.as_str(), "imperial");
    }

    #[test]
    fn test_masked_key() {
        assert_eq!(Config::masked_key(Some("abcdef1234")), "********1234");
        assert_eq!(Config::masked_key(Some("ab")), "********");
        assert_eq!(Config::masked_key(None), "(not set)");
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
