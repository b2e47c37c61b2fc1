//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable consulted when no key is set in the config file.
pub const API_KEY_ENV: &str = "BRIDGE_MONITOR_API_KEY";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Roads closure feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Weather feed settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Refresh and tick cadence
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Log filter defaults
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.trim().is_empty() {
            return Err(AppError::validation("feed.url is empty"));
        }
        if self.feed.user_agent.trim().is_empty() {
            return Err(AppError::validation("feed.user_agent is empty"));
        }
        if self.feed.timeout_secs == 0 || self.feed.connect_timeout_secs == 0 {
            return Err(AppError::validation("feed timeouts must be > 0"));
        }
        if self.weather.timeout_secs == 0 {
            return Err(AppError::validation("weather.timeout_secs must be > 0"));
        }
        if !(-90.0..=90.0).contains(&self.weather.latitude) {
            return Err(AppError::validation("weather.latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&self.weather.longitude) {
            return Err(AppError::validation("weather.longitude out of range"));
        }
        if self.monitor.refresh_interval_secs == 0 {
            return Err(AppError::validation(
                "monitor.refresh_interval_secs must be > 0",
            ));
        }
        if self.monitor.tick_interval_ms == 0 {
            return Err(AppError::validation("monitor.tick_interval_ms must be > 0"));
        }
        if self.monitor.tick_interval_ms > self.monitor.reevaluate_window_secs * 1000 {
            return Err(AppError::validation(
                "monitor.tick_interval_ms must not exceed the re-evaluation window",
            ));
        }
        Ok(())
    }
}

/// National Highways closures feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Closures endpoint
    #[serde(default = "defaults::feed_url")]
    pub url: String,

    /// Subscription key, inline
    #[serde(default)]
    pub api_key: Option<String>,

    /// File holding the subscription key
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// TCP connect timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "defaults::feed_timeout")]
    pub timeout_secs: u64,

    /// How long a fetched payload is reused without hitting the network
    #[serde(default = "defaults::feed_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl FeedConfig {
    /// Resolve the subscription key: inline, then file, then environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        if let Some(path) = &self.api_key_file {
            let key = fs::read_to_string(path).map_err(|e| {
                AppError::config(format!("Cannot read API key file {}: {e}", path.display()))
            })?;
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(AppError::MissingApiKey),
        }
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: defaults::feed_url(),
            api_key: None,
            api_key_file: None,
            user_agent: defaults::user_agent(),
            connect_timeout_secs: defaults::connect_timeout(),
            timeout_secs: defaults::feed_timeout(),
            cache_ttl_secs: defaults::feed_cache_ttl(),
        }
    }
}

/// Open-Meteo weather feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Fetch weather alongside closures
    #[serde(default = "defaults::weather_enabled")]
    pub enabled: bool,

    /// Forecast endpoint without query string
    #[serde(default = "defaults::weather_url")]
    pub url: String,

    #[serde(default = "defaults::latitude")]
    pub latitude: f64,

    #[serde(default = "defaults::longitude")]
    pub longitude: f64,

    /// IANA zone the hourly series is reported in
    #[serde(default = "defaults::timezone")]
    pub timezone: String,

    /// Whole-request timeout in seconds
    #[serde(default = "defaults::weather_timeout")]
    pub timeout_secs: u64,

    /// How long a forecast is reused
    #[serde(default = "defaults::weather_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl WeatherConfig {
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::weather_enabled(),
            url: defaults::weather_url(),
            latitude: defaults::latitude(),
            longitude: defaults::longitude(),
            timezone: defaults::timezone(),
            timeout_secs: defaults::weather_timeout(),
            cache_ttl_secs: defaults::weather_cache_ttl(),
        }
    }
}

/// Refresh and re-evaluation cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Network refresh interval
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Local tick interval for the re-evaluation trigger
    #[serde(default = "defaults::tick_interval")]
    pub tick_interval_ms: u64,

    /// How long after a planned start the trigger still fires
    #[serde(default = "defaults::reevaluate_window")]
    pub reevaluate_window_secs: u64,

    /// Countdowns are shown only this close to a closure start
    #[serde(default = "defaults::countdown_window")]
    pub countdown_window_secs: u64,
}

impl MonitorConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn reevaluate_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.reevaluate_window_secs as i64)
    }

    pub fn countdown_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.countdown_window_secs as i64)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: defaults::refresh_interval(),
            tick_interval_ms: defaults::tick_interval(),
            reevaluate_window_secs: defaults::reevaluate_window(),
            countdown_window_secs: defaults::countdown_window(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `env_logger` filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn feed_url() -> String {
        "https://api.data.nationalhighways.co.uk/roads/v2.0/closures".into()
    }
    pub fn user_agent() -> String {
        concat!("BridgeMonitor/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn connect_timeout() -> u64 {
        15
    }
    pub fn feed_timeout() -> u64 {
        30
    }
    pub fn feed_cache_ttl() -> u64 {
        30
    }

    // Weather defaults (M48 Severn Bridge)
    pub fn weather_enabled() -> bool {
        true
    }
    pub fn weather_url() -> String {
        "https://api.open-meteo.com/v1/forecast".into()
    }
    pub fn latitude() -> f64 {
        51.61
    }
    pub fn longitude() -> f64 {
        -2.64
    }
    pub fn timezone() -> String {
        "Europe/London".into()
    }
    pub fn weather_timeout() -> u64 {
        15
    }
    pub fn weather_cache_ttl() -> u64 {
        30 * 60
    }

    // Monitor defaults
    pub fn refresh_interval() -> u64 {
        5 * 60
    }
    pub fn tick_interval() -> u64 {
        1000
    }
    pub fn reevaluate_window() -> u64 {
        5
    }
    pub fn countdown_window() -> u64 {
        60 * 60
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
