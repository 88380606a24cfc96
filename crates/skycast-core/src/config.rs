use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Sample snapshot shipped with the app, installed into `config_dir` on first run
pub const BUNDLED_SNAPSHOT: &str =
    include_str!("../../../resources/sample-data/weather-snapshot.json");

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

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather backend settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Place suggestion settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Where preferences and lists are persisted (relative to `config_dir`)
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the remote weather API (current.json / forecast.json live under it)
    #[serde(default = "default_weather_api_url")]
    pub api_base_url: String,

    /// Offline snapshot used when no API key is configured
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Number of forecast days requested from the remote backend
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_weather_api_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("weather-snapshot.json")
}

fn default_forecast_days() -> u32 {
    7
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_weather_api_url(),
            snapshot_path: default_snapshot_path(),
            forecast_days: default_forecast_days(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Structured geocoder (search.json), used when an API key is configured
    #[serde(default = "default_weather_api_url")]
    pub primary_base_url: String,

    /// Unstructured fallback geocoder (Nominatim)
    #[serde(default = "default_fallback_url")]
    pub fallback_base_url: String,

    #[serde(default = "default_geocode_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fallback_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocode_timeout() -> u64 {
    6
}

fn default_user_agent() -> String {
    format!("SkyCast/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            primary_base_url: default_weather_api_url(),
            fallback_base_url: default_fallback_url(),
            timeout_secs: default_geocode_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_preferences_file")]
    pub preferences_file: String,

    #[serde(default = "default_favorites_file")]
    pub favorites_file: String,

    #[serde(default = "default_last_query_file")]
    pub last_query_file: String,
}

fn default_preferences_file() -> String {
    "preferences.json".to_string()
}

fn default_favorites_file() -> String {
    "favorites.txt".to_string()
}

fn default_last_query_file() -> String {
    "last_query.txt".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            preferences_file: default_preferences_file(),
            favorites_file: default_favorites_file(),
            last_query_file: default_last_query_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
            storage: StorageConfig::default(),
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
    /// Warnings are logged; critical errors fail the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        config.install_bundled_snapshot()?;
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

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);
        self.validate_url(
            &self.geocoding.primary_base_url,
            "geocoding.primary_base_url",
            &mut result,
        );
        self.validate_url(
            &self.geocoding.fallback_base_url,
            "geocoding.fallback_base_url",
            &mut result,
        );

        if self.weather.forecast_days == 0 || self.weather.forecast_days > 14 {
            result.add_error(
                "weather.forecast_days",
                "Forecast days must be between 1 and 14",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.geocoding.timeout_secs == 0 {
            result.add_error(
                "geocoding.timeout_secs",
                "Geocoder timeout must be greater than 0",
            );
        }

        if self.geocoding.user_agent.trim().is_empty() {
            result.add_warning(
                "geocoding.user_agent",
                "Empty user agent; the fallback geocoder may reject requests",
            );
        }

        let snapshot = self.snapshot_path();
        if !snapshot.exists() {
            result.add_warning(
                "weather.snapshot_path",
                format!(
                    "Offline snapshot not found: {} (offline mode will fail)",
                    snapshot.display()
                ),
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Snapshot path, resolved against `config_dir` when relative.
    pub fn snapshot_path(&self) -> PathBuf {
        self.resolve(&self.weather.snapshot_path)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.join(&self.storage.preferences_file)
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.config_dir.join(&self.storage.favorites_file)
    }

    pub fn last_query_path(&self) -> PathBuf {
        self.config_dir.join(&self.storage.last_query_file)
    }

    /// Write [`BUNDLED_SNAPSHOT`] to the default snapshot location if nothing is there yet.
    ///
    /// A custom `snapshot_path` is never written to. Returns whether a file was created.
    pub fn install_bundled_snapshot(&self) -> Result<bool> {
        if self.weather.snapshot_path != default_snapshot_path() {
            return Ok(false);
        }

        let path = self.snapshot_path();
        if path.exists() {
            return Ok(false);
        }

        std::fs::create_dir_all(&self.config_dir).context("Failed to create config directory")?;
        std::fs::write(&path, BUNDLED_SNAPSHOT).context("Failed to write offline snapshot")?;
        tracing::info!("Installed sample snapshot at {}", path.display());
        Ok(true)
    }

    fn resolve(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
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

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
