// src/pipeline/monitor.rs

//! Fetch, evaluate and publish on two independent schedules.
//!
//! - Refresh: fetch closures (through the response cache), evaluate, publish.
//! - Tick: check the re-evaluation trigger against the current snapshot and
//!   re-derive it locally from the stored records when a start time passes.
//!
//! Snapshots are published through a `watch` channel so readers always see
//! one complete `BridgeData`.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::{BridgeData, ClosureRecord, Config, MonitorConfig};
use crate::services::ClosureSource;
use crate::storage::{Clock, ResponseCache, SystemClock};

use super::diff::{StatusDiff, diff};
use super::{aggregate, filter, trigger};

/// Latest published snapshot, if any.
pub type Snapshot = Option<Arc<BridgeData>>;

/// Owns the closure source, cache and published snapshot.
pub struct Monitor {
    settings: MonitorConfig,
    source: Arc<dyn ClosureSource>,
    clock: Arc<dyn Clock>,
    cache: Mutex<ResponseCache<Vec<ClosureRecord>>>,
    /// Records behind the published snapshot. Held from read to publish.
    records: Mutex<Option<Arc<Vec<ClosureRecord>>>>,
    tx: watch::Sender<Snapshot>,
}

impl Monitor {
    /// Create a monitor on the system clock.
    pub fn new(config: &Config, source: Arc<dyn ClosureSource>) -> Self {
        Self::with_clock(config, source, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, source: Arc<dyn ClosureSource>, clock: Arc<dyn Clock>) -> Self {
        let cache = ResponseCache::new(config.feed.cache_ttl(), Arc::clone(&clock));
        let (tx, _) = watch::channel(None);

        Self {
            settings: config.monitor.clone(),
            source,
            clock,
            cache: Mutex::new(cache),
            records: Mutex::new(None),
            tx,
        }
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// The current snapshot.
    pub fn current(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Fetch (or reuse cached) records, evaluate at `now` and publish.
    ///
    /// On failure the previous snapshot stays published.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<Arc<BridgeData>> {
        let cached = self.cache.lock().unwrap_or_else(|e| e.into_inner()).get();

        let records = match cached {
            Some(records) => {
                log::debug!("Closures cache still fresh; skipping fetch");
                records
            }
            None => {
                let payload = self.source.fetch_payload().await.inspect_err(|e| {
                    log::warn!("Failed to fetch closures from {}: {}", self.source.name(), e);
                })?;

                let (records, decoded) = self
                    .cache
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .store_with(&payload, |p| {
                        let mut records = self.source.decode(p)?;
                        records.retain(filter::is_relevant);
                        Ok::<_, crate::error::AppError>(records)
                    })
                    .inspect_err(|e| {
                        log::warn!("Failed to decode closures from {}: {}", self.source.name(), e);
                    })?;

                if decoded {
                    log::info!("Fetched {} relevant closure record(s)", records.len());
                } else {
                    log::debug!("Closures payload unchanged");
                }
                records
            }
        };

        let records = Arc::new(records);
        let mut stored = self.records.lock().unwrap_or_else(|e| e.into_inner());
        *stored = Some(Arc::clone(&records));

        // Publish before releasing the lock so a concurrent re-evaluation of
        // the superseded records cannot land after this snapshot.
        Ok(self.publish(aggregate::evaluate(&records, now)))
    }

    /// Re-evaluate the stored records at `now` without any I/O.
    ///
    /// Returns `None` before the first successful refresh.
    pub fn reevaluate(&self, now: DateTime<Utc>) -> Option<Arc<BridgeData>> {
        let stored = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let records = stored.as_ref()?;
        Some(self.publish(aggregate::evaluate(records, now)))
    }

    /// Run the trigger at `now`; re-evaluate if it fires.
    ///
    /// Returns whether a re-evaluation happened.
    pub fn tick(&self, now: DateTime<Utc>) -> bool {
        let Some(current) = self.current() else {
            return false;
        };

        if !trigger::should_reevaluate(&current, now, self.settings.reevaluate_window()) {
            return false;
        }

        log::debug!("Planned closure start reached; re-evaluating");
        self.reevaluate(now).is_some()
    }

    fn publish(&self, data: BridgeData) -> Arc<BridgeData> {
        let data = Arc::new(data);
        let previous = self.tx.send_replace(Some(Arc::clone(&data)));

        match previous {
            Some(previous) => log_diff(&diff(&previous, &data)),
            None => {
                for bridge in data.bridges() {
                    log::info!("{}: {}", bridge.id, bridge.message);
                }
            }
        }
        data
    }

    /// Run the refresh and tick loops until `shutdown` completes.
    pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()> + Send) -> Result<()> {
        let refresh_every = self.settings.refresh_interval();
        let tick_every = self.settings.tick_interval();

        log::info!(
            "Monitoring closures from {} (refresh every {}s)",
            self.source.name(),
            refresh_every.as_secs()
        );

        let refresher = {
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(refresh_every);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    // Errors are logged inside refresh
                    let _ = this.refresh(this.clock.now()).await;
                }
            })
        };

        let ticker = {
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tick_every);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    this.tick(this.clock.now());
                }
            })
        };

        shutdown.await;
        log::info!("Shutting down monitor");
        refresher.abort();
        ticker.abort();
        Ok(())
    }
}

fn log_diff(changes: &StatusDiff) {
    if !changes.has_changes() {
        return;
    }

    log::info!("{} change(s) since last snapshot", changes.change_count());
    for t in &changes.transitions {
        log::info!("{} {}: {} -> {}", t.bridge, t.scope, t.from, t.to);
    }
    for c in &changes.added {
        log::info!("New closure on {}: {}", c.bridge, c.description);
    }
    for c in &changes.activated {
        log::info!("Closure now in effect on {}: {}", c.bridge, c.description);
    }
    for c in &changes.removed {
        log::info!("Closure cleared on {}: {}", c.bridge, c.description);
    }
}
