//! Periodic background sweeping of registered stores.
//!
//! The scheduler exists only to bound memory: stores stay correct without
//! it because expiry is also checked lazily on every read. Disabling the
//! sweep can only leave expired entries unreclaimed, never serve them.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::config::SweepConfig;
use crate::store::TimedStore;

/// Default interval between sweep passes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Anything whose expired entries can be purged in bulk.
pub trait Sweep: Send + Sync {
    /// Remove all expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

impl<V: Send + Sync> Sweep for TimedStore<V> {
    fn sweep(&self) -> usize {
        TimedStore::sweep(self)
    }
}

/// Runs [`Sweep::sweep`] on every registered store at a fixed interval.
///
/// Built once at process initialization; [`start`](SweepScheduler::start)
/// consumes the scheduler and returns a handle that stops the background
/// task when shut down or dropped.
pub struct SweepScheduler {
    /// Stores to sweep each pass
    stores: Vec<Arc<dyn Sweep>>,
    /// Interval between passes
    interval: Duration,
}

impl SweepScheduler {
    /// Create a scheduler with an explicit interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            stores: Vec::new(),
            interval,
        }
    }

    /// Create a scheduler from configuration.
    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(config.interval())
    }

    /// Register a store to be swept each pass.
    pub fn register(&mut self, store: Arc<dyn Sweep>) {
        self.stores.push(store);
    }

    /// Spawn the background sweep task.
    pub fn start(self) -> SweepHandle {
        let Self { stores, interval } = self;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the first
            // pass runs one full interval after startup
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut removed = 0;
                for store in &stores {
                    removed += store.sweep();
                }
                if removed > 0 {
                    debug!(removed, "Sweep pass reclaimed expired entries");
                } else {
                    trace!("Sweep pass found nothing to reclaim");
                }
            }
        });
        SweepHandle { task }
    }
}

impl Default for SweepScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}

/// Handle to the running sweep task.
///
/// The task runs for the process lifetime unless shut down; dropping the
/// handle also stops it, which keeps test runtimes clean.
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Stop the background sweep task.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
