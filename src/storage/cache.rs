//! TTL cache for one upstream response.
//!
//! Holds the raw payload, its SHA-256 fingerprint and the decoded value.
//! When a refetch returns the same payload the decoded value is reused and
//! only the fetch time moves.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use super::Clock;

/// Hex SHA-256 of a payload.
pub fn fingerprint(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// A cached payload and what it decoded to.
#[derive(Debug, Clone)]
pub struct CachedResponse<T> {
    pub fingerprint: String,
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

/// Single-entry cache with a time-to-live.
pub struct ResponseCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: Option<CachedResponse<T>>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether an entry exists and is younger than the TTL.
    pub fn is_fresh(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| self.clock.now() - e.fetched_at < self.ttl)
    }

    /// The cached value if still fresh.
    pub fn get(&self) -> Option<T> {
        if self.is_fresh() {
            self.entry.as_ref().map(|e| e.value.clone())
        } else {
            None
        }
    }

    /// The cached value regardless of age.
    pub fn get_stale(&self) -> Option<T> {
        self.entry.as_ref().map(|e| e.value.clone())
    }

    pub fn entry(&self) -> Option<&CachedResponse<T>> {
        self.entry.as_ref()
    }

    /// Store a freshly fetched payload, decoding it only if it changed.
    ///
    /// Returns the value now held and whether `decode` ran. A decode
    /// failure leaves the existing entry untouched.
    pub fn store_with<E>(
        &mut self,
        payload: &str,
        decode: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<(T, bool), E> {
        let now = self.clock.now();
        let digest = fingerprint(payload);

        if let Some(entry) = self.entry.as_mut().filter(|e| e.fingerprint == digest) {
            entry.fetched_at = now;
            return Ok((entry.value.clone(), false));
        }

        let value = decode(payload)?;
        self.entry = Some(CachedResponse {
            fingerprint: digest,
            value: value.clone(),
            fetched_at: now,
        });
        Ok((value, true))
    }

    /// Store an already-decoded value under a payload's fingerprint.
    pub fn store(&mut self, payload: &str, value: T) {
        self.entry = Some(CachedResponse {
            fingerprint: fingerprint(payload),
            value,
            fetched_at: self.clock.now(),
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ManualClock;
    use chrono::TimeZone;

    fn setup(ttl_secs: i64) -> (Arc<ManualClock>, ResponseCache<Vec<u32>>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let cache = ResponseCache::new(Duration::seconds(ttl_secs), clock.clone());
        (clock, cache)
    }

    fn decode(payload: &str) -> Result<Vec<u32>, String> {
        payload
            .split(',')
            .map(|s| s.trim().parse::<u32>().map_err(|e| e.to_string()))
            .collect()
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = fingerprint("hello");
        assert_eq!(fp.len(), 64);
        assert_eq!(
            fp,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_ne!(fingerprint("hello"), fingerprint("hello "));
    }

    #[test]
    fn test_empty_cache_is_stale() {
        let (_, cache) = setup(30);
        assert!(!cache.is_fresh());
        assert_eq!(cache.get(), None);
        assert_eq!(cache.get_stale(), None);
    }

    #[test]
    fn test_ttl_expiry() {
        let (clock, mut cache) = setup(30);
        cache.store("1,2", vec![1, 2]);
        assert_eq!(cache.get(), Some(vec![1, 2]));

        clock.advance(Duration::seconds(29));
        assert!(cache.is_fresh());

        clock.advance(Duration::seconds(1));
        assert!(!cache.is_fresh());
        assert_eq!(cache.get(), None);
        assert_eq!(cache.get_stale(), Some(vec![1, 2]));
    }

    #[test]
    fn test_unchanged_payload_skips_decode() {
        let (clock, mut cache) = setup(30);

        let (value, decoded) = cache.store_with("1,2,3", decode).unwrap();
        assert_eq!(value, vec![1, 2, 3]);
        assert!(decoded);

        clock.advance(Duration::seconds(60));
        assert!(!cache.is_fresh());

        let (value, decoded) = cache
            .store_with("1,2,3", |_| -> Result<Vec<u32>, String> {
                panic!("decode must not run for an unchanged payload")
            })
            .unwrap();
        assert_eq!(value, vec![1, 2, 3]);
        assert!(!decoded);
        assert!(cache.is_fresh());
    }

    #[test]
    fn test_changed_payload_decodes() {
        let (_, mut cache) = setup(30);
        cache.store_with("1", decode).unwrap();
        let (value, decoded) = cache.store_with("4,5", decode).unwrap();
        assert!(decoded);
        assert_eq!(value, vec![4, 5]);
        assert_eq!(cache.entry().unwrap().fingerprint, fingerprint("4,5"));
    }

    #[test]
    fn test_decode_failure_keeps_previous_entry() {
        let (_, mut cache) = setup(30);
        cache.store_with("7", decode).unwrap();
        assert!(cache.store_with("not a number", decode).is_err());
        assert_eq!(cache.get(), Some(vec![7]));
    }

    #[test]
    fn test_invalidate() {
        let (_, mut cache) = setup(30);
        cache.store("1", vec![1]);
        cache.invalidate();
        assert_eq!(cache.get_stale(), None);
    }
}
