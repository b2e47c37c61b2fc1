//! Rendering of status snapshots for people.

mod console;

use chrono::{DateTime, Utc};

use crate::models::{BridgeData, WeatherData};

pub use console::ConsoleReport;

/// Turns the status model into display text.
pub trait StatusPresenter {
    /// Per-bridge status, directions, closures and countdowns.
    fn render_status(&self, data: &BridgeData, now: DateTime<Utc>) -> String;

    /// Every known closure across both bridges, ordered by start time.
    fn render_upcoming(&self, data: &BridgeData, now: DateTime<Utc>) -> String;

    /// Weather summary.
    fn render_weather(&self, weather: &WeatherData) -> String;
}
