//! Closure interpretation pipeline.
//!
//! - `filter`: relevance of raw records to the tracked crossings
//! - `temporal`: whether a closure is in effect at an instant
//! - `classify`: severity, cleaned description and direction
//! - `aggregate`: per-bridge and per-direction status (`evaluate`)
//! - `trigger`: local re-evaluation and countdowns
//! - `diff`: changes between snapshots
//! - `monitor`: fetch/evaluate/publish loops

pub mod aggregate;
pub mod classify;
pub mod diff;
pub mod filter;
pub mod monitor;
pub mod temporal;
pub mod trigger;

pub use aggregate::evaluate;
pub use diff::{StatusDiff, diff};
pub use monitor::Monitor;
pub use trigger::{Countdown, next_countdown, should_reevaluate};
