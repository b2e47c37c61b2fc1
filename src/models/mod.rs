// src/models/mod.rs

//! Domain models for the bridge monitor.
//!
//! Raw feed records, classified closures, the per-bridge status snapshot,
//! weather data and application configuration.

mod bridge;
mod closure;
pub mod config;
mod weather;

// Re-export all public types
pub use bridge::{Bridge, BridgeData, BridgeId, BridgeStatus, DirectionalStatus};
pub use closure::{Closure, ClosureRecord, ClosureStatus, Direction, Severity, ValidityState};
pub use config::{Config, FeedConfig, LoggingConfig, MonitorConfig, WeatherConfig};
pub use weather::{WeatherData, WindRiskLevel};
