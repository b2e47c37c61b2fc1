//! Service layer for the bridge monitor.
//!
//! - Closure sources (`ClosureFeedClient` over HTTP, `FileSource` for replay)
//! - DATEX payload decoding (`datex`)
//! - Weather fetching (`WeatherClient`)

mod closures;
pub mod datex;
mod file;
mod weather;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ClosureRecord;

pub use closures::ClosureFeedClient;
pub use file::FileSource;
pub use weather::{WeatherClient, parse_forecast, weather_url};

/// Anything that can produce a raw closure payload.
///
/// Fetching and decoding are split so callers can cache the raw payload and
/// skip decoding when it has not changed.
#[async_trait]
pub trait ClosureSource: Send + Sync {
    /// Human-readable source name for logs and errors.
    fn name(&self) -> &str;

    /// Fetch the raw payload.
    async fn fetch_payload(&self) -> Result<String>;

    /// Decode a payload into records. Accepts DATEX XML or a JSON array.
    fn decode(&self, payload: &str) -> Result<Vec<ClosureRecord>> {
        datex::decode_payload(payload)
    }

    /// Fetch and decode in one step.
    async fn fetch(&self) -> Result<Vec<ClosureRecord>> {
        let payload = self.fetch_payload().await?;
        self.decode(&payload)
    }
}
