//! Plain-text report for terminals.

use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Bridge, BridgeData, BridgeStatus, Closure, Direction, DirectionalStatus, WeatherData};
use crate::pipeline::temporal;
use crate::pipeline::trigger::{self, DEFAULT_COUNTDOWN_WINDOW_SECS};
use crate::utils::time::{format_clock, format_feed_time};

use super::StatusPresenter;

/// Console renderer.
#[derive(Debug, Clone)]
pub struct ConsoleReport {
    countdown_window: Duration,
}

impl Default for ConsoleReport {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_COUNTDOWN_WINDOW_SECS))
    }
}

impl ConsoleReport {
    pub fn new(countdown_window: Duration) -> Self {
        Self { countdown_window }
    }

    fn direction_line(status: &DirectionalStatus) -> String {
        format!("  {}: {}", status.direction.label(), status.status)
    }

    fn closure_block(closure: &Closure, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let state = if closure.is_active() { "ACTIVE" } else { "Planned" };
        let _ = write!(out, "  - {state}");
        if closure.direction != Direction::Unknown {
            let _ = write!(out, " - {}", closure.direction.label());
        }
        let _ = write!(out, ": {}", closure.description);

        if !closure.is_active() {
            if let Some(start) = &closure.start {
                let _ = write!(out, "\n      From: {}", format_feed_time(start, now));
            }
        }
        if let Some(end) = &closure.end {
            let _ = write!(out, "\n      Until: {}", format_feed_time(end, now));
        }
        out
    }

    fn bridge_section(&self, bridge: &Bridge, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} [{}]", bridge.name, bridge.status);
        let _ = writeln!(out, "  {}", bridge.message);
        let _ = writeln!(out, "{}", Self::direction_line(&bridge.eastbound));
        let _ = writeln!(out, "{}", Self::direction_line(&bridge.westbound));

        if bridge.has_restrictions() {
            let closed = bridge.eastbound.status == BridgeStatus::Closed
                || bridge.westbound.status == BridgeStatus::Closed;
            let notice = if closed {
                "Bridge closure in effect"
            } else {
                "Lane restrictions in effect"
            };
            let _ = writeln!(out, "  ! {notice}");
        }

        if let Some(countdown) = trigger::next_countdown(bridge, now, self.countdown_window) {
            let _ = writeln!(out, "  {countdown}");
        }

        for closure in &bridge.closures {
            let _ = writeln!(out, "{}", Self::closure_block(closure, now));
        }
        out
    }
}

impl StatusPresenter for ConsoleReport {
    fn render_status(&self, data: &BridgeData, now: DateTime<Utc>) -> String {
        let sections: Vec<String> = data
            .bridges()
            .into_iter()
            .map(|b| self.bridge_section(b, now))
            .collect();

        let mut out = sections.join("\n");
        let _ = write!(out, "\nLast updated: {}", format_clock(data.last_updated));
        if data.unassigned_closures > 0 {
            let _ = write!(
                out,
                "\n{} nearby closure(s) could not be matched to a bridge",
                data.unassigned_closures
            );
        }
        out
    }

    fn render_upcoming(&self, data: &BridgeData, now: DateTime<Utc>) -> String {
        let mut closures: Vec<&Closure> = data.closures().collect();
        if closures.is_empty() {
            return "No closures scheduled".to_string();
        }

        // Missing starts first (already in effect), then by instant, then
        // starts that do not parse
        closures.sort_by_key(|c| match c.start.as_deref() {
            None => (0, None),
            Some(text) => match temporal::parse_utc(text) {
                Some(t) => (1, Some(t)),
                None => (2, None),
            },
        });

        let blocks: Vec<String> = closures
            .into_iter()
            .map(|c| format!("{}\n  {}\n{}", c.bridge.short_name(), c.location, Self::closure_block(c, now)))
            .collect();
        blocks.join("\n\n")
    }

    fn render_weather(&self, weather: &WeatherData) -> String {
        let mut out = String::from("Weather at the Severn crossings\n");

        let _ = match weather.current_temperature {
            Some(t) => writeln!(out, "  Now: {t:.1}°C"),
            None => writeln!(out, "  Now: --"),
        };
        if let Some(wind) = weather.current_wind_speed {
            let _ = writeln!(out, "  Wind: {wind:.0} mph");
        }
        if let Some(rain) = weather.current_rain_probability {
            let _ = writeln!(out, "  Rain chance: {rain}%");
        }
        if let (Some(high), Some(low)) = (weather.high_temperature, weather.low_temperature) {
            let _ = writeln!(
                out,
                "  High {high:.1}°C at {}, low {low:.1}°C at {}",
                weather.high_temp_time.as_deref().unwrap_or("--"),
                weather.low_temp_time.as_deref().unwrap_or("--")
            );
        }
        if let Some(rain) = weather.max_rain_probability {
            let _ = writeln!(
                out,
                "  Peak rain chance: {rain}% at {}",
                weather.rain_time.as_deref().unwrap_or("--")
            );
        }
        if let Some(gust) = weather.max_wind_gust {
            let _ = writeln!(
                out,
                "  Max gust: {gust:.0} mph at {}",
                weather.gust_time.as_deref().unwrap_or("--")
            );
        }
        let _ = write!(out, "  Wind risk: {}", weather.wind_risk);
        out
    }
}
