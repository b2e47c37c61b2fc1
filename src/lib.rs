// src/lib.rs

//! Severn Bridge Monitor Library
//!
//! Interprets road-closure records for the M48 Severn Bridge and the M4
//! Prince of Wales Bridge into a per-bridge, per-direction status model.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod present;
pub mod services;
pub mod storage;
pub mod utils;
