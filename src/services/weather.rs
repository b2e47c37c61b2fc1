// src/services/weather.rs

//! Open-Meteo weather client for the crossing location.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FeedConfig, WeatherConfig, WeatherData, WindRiskLevel};
use crate::storage::{Clock, ResponseCache};
use crate::utils::http;

const KMH_TO_MPH: f64 = 0.621371;

const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,windgusts_10m";

#[derive(Debug, Default, Deserialize)]
struct Forecast {
    current_weather: Option<CurrentWeather>,
    hourly: Option<Hourly>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    /// km/h
    windspeed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Hourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<u8>>,
    /// km/h
    windgusts_10m: Vec<Option<f64>>,
}

impl Hourly {
    /// "2026-01-29T14:00" → "14:00"
    fn time_at(&self, index: usize) -> Option<String> {
        self.time.get(index).map(|t| match t.split_once('T') {
            Some((_, time)) => time.to_string(),
            None => t.clone(),
        })
    }
}

/// Index and value of the first maximum, skipping nulls.
fn first_max<T: PartialOrd + Copy>(values: &[Option<T>]) -> Option<(usize, T)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
}

/// Index and value of the first minimum, skipping nulls.
fn first_min<T: PartialOrd + Copy>(values: &[Option<T>]) -> Option<(usize, T)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if v >= b => best,
            _ => Some((i, v)),
        })
}

/// Parse an Open-Meteo forecast response.
///
/// Wind speeds are converted to mph. Rain and gust maxima of zero count as
/// absent. Risk is graded on the max gust, else the current wind.
pub fn parse_forecast(body: &str, now: DateTime<Utc>) -> Result<WeatherData> {
    let forecast: Forecast = serde_json::from_str(body)?;
    let current = forecast.current_weather.unwrap_or_default();
    let hourly = forecast.hourly.unwrap_or_default();

    let current_wind_speed = current.windspeed.map(|kmh| kmh * KMH_TO_MPH);

    let high = first_max(&hourly.temperature_2m);
    let low = first_min(&hourly.temperature_2m);
    let rain = first_max(&hourly.precipitation_probability).filter(|(_, p)| *p > 0);
    let gust = first_max(&hourly.windgusts_10m).filter(|(_, g)| *g > 0.0);

    let max_wind_gust = gust.map(|(_, kmh)| kmh * KMH_TO_MPH);
    let wind_risk = WindRiskLevel::from_mph(max_wind_gust.or(current_wind_speed));

    Ok(WeatherData {
        current_temperature: current.temperature,
        current_wind_speed,
        current_rain_probability: hourly
            .precipitation_probability
            .first()
            .map(|p| p.unwrap_or(0)),
        high_temperature: high.map(|(_, t)| t),
        high_temp_time: high.and_then(|(i, _)| hourly.time_at(i)),
        low_temperature: low.map(|(_, t)| t),
        low_temp_time: low.and_then(|(i, _)| hourly.time_at(i)),
        max_rain_probability: rain.map(|(_, p)| p),
        rain_time: rain.and_then(|(i, _)| hourly.time_at(i)),
        max_wind_gust,
        gust_time: gust.and_then(|(i, _)| hourly.time_at(i)),
        wind_risk,
        last_updated: now,
    })
}

/// Build the forecast request URL from configuration.
pub fn weather_url(config: &WeatherConfig) -> Result<Url> {
    let url = Url::parse_with_params(
        &config.url,
        &[
            ("latitude", config.latitude.to_string()),
            ("longitude", config.longitude.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", config.timezone.clone()),
            ("forecast_days", "1".to_string()),
            ("current_weather", "true".to_string()),
        ],
    )?;
    Ok(url)
}

/// Fetches weather with a TTL cache in front.
pub struct WeatherClient {
    client: Client,
    url: Url,
    clock: Arc<dyn Clock>,
    cache: Mutex<ResponseCache<WeatherData>>,
}

impl WeatherClient {
    pub fn new(feed: &FeedConfig, config: &WeatherConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = http::create_weather_client(feed, config)?;
        Ok(Self::with_client(client, weather_url(config)?, config, clock))
    }

    pub fn with_client(
        client: Client,
        url: Url,
        config: &WeatherConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = ResponseCache::new(config.cache_ttl(), Arc::clone(&clock));
        Self {
            client,
            url,
            clock,
            cache: Mutex::new(cache),
        }
    }

    /// Current weather, from cache while fresh.
    pub async fn fetch(&self) -> Result<WeatherData> {
        let now = self.clock.now();

        let cached = self.cache.lock().unwrap_or_else(|e| e.into_inner()).get();
        if let Some(mut data) = cached {
            log::debug!("Using cached weather data");
            data.last_updated = now;
            return Ok(data);
        }

        log::debug!("Fetching weather from {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Feed {
                status: status.as_u16(),
                message: format!("Weather API returned {}", status.as_u16()),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(AppError::empty_response("Open-Meteo"));
        }

        let (data, _) = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .store_with(&body, |b| parse_forecast(b, now))?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ManualClock;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 29, 9, 0, 0).unwrap()
    }

    fn body(gusts_kmh: &[f64], current_kmh: f64) -> String {
        let times: Vec<String> = (0..gusts_kmh.len())
            .map(|h| format!("\"2026-01-29T{h:02}:00\""))
            .collect();
        let gusts: Vec<String> = gusts_kmh.iter().map(|g| g.to_string()).collect();
        format!(
            r#"{{
                "current_weather": {{"temperature": 6.5, "windspeed": {current_kmh}}},
                "hourly": {{
                    "time": [{}],
                    "windgusts_10m": [{}]
                }}
            }}"#,
            times.join(","),
            gusts.join(",")
        )
    }

    const FULL: &str = r#"{
        "current_weather": {"temperature": 7.2, "windspeed": 20.0},
        "hourly": {
            "time": ["2026-01-29T00:00", "2026-01-29T01:00", "2026-01-29T02:00", "2026-01-29T03:00"],
            "temperature_2m": [5.0, 9.5, 3.1, 9.5],
            "precipitation_probability": [10, 40, null, 40],
            "windgusts_10m": [30.0, 50.0, 45.0, null]
        }
    }"#;

    #[test]
    fn test_parse_full_forecast() {
        let data = parse_forecast(FULL, now()).unwrap();

        assert_eq!(data.current_temperature, Some(7.2));
        let wind = data.current_wind_speed.unwrap();
        assert!((wind - 12.42742).abs() < 1e-4);
        assert_eq!(data.current_rain_probability, Some(10));

        assert_eq!(data.high_temperature, Some(9.5));
        assert_eq!(data.high_temp_time.as_deref(), Some("01:00"));
        assert_eq!(data.low_temperature, Some(3.1));
        assert_eq!(data.low_temp_time.as_deref(), Some("02:00"));

        assert_eq!(data.max_rain_probability, Some(40));
        assert_eq!(data.rain_time.as_deref(), Some("01:00"));

        let gust = data.max_wind_gust.unwrap();
        assert!((gust - 31.06855).abs() < 1e-4);
        assert_eq!(data.gust_time.as_deref(), Some("01:00"));
        assert_eq!(data.wind_risk, WindRiskLevel::Monitor);
        assert_eq!(data.last_updated, now());
    }

    #[test]
    fn test_risk_levels_from_gusts() {
        // 22, 35 and 48 mph
        let cases = [
            (22.0 / KMH_TO_MPH, WindRiskLevel::Safe),
            (35.0 / KMH_TO_MPH, WindRiskLevel::Monitor),
            (48.0 / KMH_TO_MPH, WindRiskLevel::HighRisk),
        ];
        for (kmh, expected) in cases {
            let data = parse_forecast(&body(&[10.0, kmh], 5.0), now()).unwrap();
            assert_eq!(data.wind_risk, expected, "gust {kmh} km/h");
            assert_eq!(data.gust_time.as_deref(), Some("01:00"));
        }
    }

    #[test]
    fn test_risk_falls_back_to_current_wind() {
        let data = parse_forecast(&body(&[0.0, 0.0], 80.0), now()).unwrap();
        assert_eq!(data.max_wind_gust, None);
        assert_eq!(data.wind_risk, WindRiskLevel::HighRisk);
    }

    #[test]
    fn test_empty_forecast() {
        let data = parse_forecast("{}", now()).unwrap();
        assert_eq!(data.current_temperature, None);
        assert_eq!(data.current_rain_probability, None);
        assert_eq!(data.max_rain_probability, None);
        assert_eq!(data.high_temperature, None);
        assert_eq!(data.wind_risk, WindRiskLevel::Unknown);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(parse_forecast("not json", now()), Err(AppError::Json(_))));
    }

    #[test]
    fn test_weather_url() {
        let url = weather_url(&WeatherConfig::default()).unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("api.open-meteo.com"));
        assert!(query.contains(&("latitude".into(), "51.61".into())));
        assert!(query.contains(&("longitude".into(), "-2.64".into())));
        assert!(query.contains(&("hourly".into(), HOURLY_FIELDS.into())));
        assert!(query.contains(&("timezone".into(), "Europe/London".into())));
        assert!(query.contains(&("current_weather".into(), "true".into())));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let clock = Arc::new(ManualClock::new(now()));
        let config = WeatherConfig::default();
        // Unroutable URL: any network access would fail the test
        let url = Url::parse("http://127.0.0.1:9/forecast").unwrap();
        let client = WeatherClient::with_client(Client::new(), url, &config, clock.clone());

        let seeded = parse_forecast(FULL, now()).unwrap();
        client
            .cache
            .lock()
            .unwrap()
            .store(FULL, seeded.clone());

        clock.advance(chrono::Duration::minutes(10));
        let data = client.fetch().await.unwrap();
        assert_eq!(data.max_wind_gust, seeded.max_wind_gust);
        assert_eq!(data.last_updated, now() + chrono::Duration::minutes(10));
    }
}
