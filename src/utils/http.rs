// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::{FeedConfig, WeatherConfig};

/// Create the client used for the roads feed.
pub fn create_client(config: &FeedConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create the client used for the weather feed.
///
/// Shares the roads feed's user agent.
pub fn create_weather_client(feed: &FeedConfig, weather: &WeatherConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&feed.user_agent)
        .connect_timeout(Duration::from_secs(feed.connect_timeout_secs))
        .timeout(Duration::from_secs(weather.timeout_secs))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_build_from_defaults() {
        let feed = FeedConfig::default();
        let weather = WeatherConfig::default();
        assert!(create_client(&feed).is_ok());
        assert!(create_weather_client(&feed, &weather).is_ok());
    }
}
