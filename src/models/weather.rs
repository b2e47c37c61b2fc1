//! Weather summary at the crossings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gust speed (mph) from which high-sided vehicles should be watched.
pub const MONITOR_GUST_MPH: f64 = 30.0;

/// Gust speed (mph) at which wind-related closures become likely.
pub const HIGH_RISK_GUST_MPH: f64 = 45.0;

/// Wind risk graded from the strongest expected gust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindRiskLevel {
    Safe,
    Monitor,
    HighRisk,
    Unknown,
}

impl WindRiskLevel {
    /// Grade a wind speed in mph.
    pub fn from_mph(mph: Option<f64>) -> Self {
        match mph {
            None => Self::Unknown,
            Some(v) if v.is_nan() => Self::Unknown,
            Some(v) if v >= HIGH_RISK_GUST_MPH => Self::HighRisk,
            Some(v) if v >= MONITOR_GUST_MPH => Self::Monitor,
            Some(_) => Self::Safe,
        }
    }
}

impl fmt::Display for WindRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindRiskLevel::Safe => "Safe",
            WindRiskLevel::Monitor => "Monitor winds",
            WindRiskLevel::HighRisk => "High wind risk",
            WindRiskLevel::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Current conditions and today's extremes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// °C
    pub current_temperature: Option<f64>,
    /// mph
    pub current_wind_speed: Option<f64>,
    /// Percent, first hourly slot
    pub current_rain_probability: Option<u8>,
    pub high_temperature: Option<f64>,
    pub high_temp_time: Option<String>,
    pub low_temperature: Option<f64>,
    pub low_temp_time: Option<String>,
    pub max_rain_probability: Option<u8>,
    pub rain_time: Option<String>,
    /// mph
    pub max_wind_gust: Option<f64>,
    pub gust_time: Option<String>,
    pub wind_risk: WindRiskLevel,
    pub last_updated: DateTime<Utc>,
}
