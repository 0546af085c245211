//! Storage backends for bucket state.
//!
//! A backend needs exactly one capability: atomically apply a GCRA delta to
//! a key and report the decision. The read of the stored TAT and the
//! conditional write must be indivisible with respect to concurrent calls on
//! the same key from any process, and `now` must come from the backend's own
//! clock so a fleet of callers with skewed clocks cannot skew the refill
//! rate.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::clock::{Clock, SystemClock};
use crate::error::RateLimitError;
use crate::gcra::{self, EpochMillis};

/// Decision returned by [`Storage::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    /// Whether the delta conformed to the bucket's quota.
    pub conforming: bool,
    /// Earliest instant at which the delta conforms; in the past or present
    /// when `conforming` is true, otherwise the advisory retry-at instant.
    pub time_to_act: EpochMillis,
}

/// A bucket state store with one atomic operation.
#[async_trait]
pub trait Storage: Send + Sync + fmt::Debug {
    /// Atomically apply `delta` tokens to `key` under the given quota and
    /// return the decision.
    ///
    /// On a conforming mutation the backend also refreshes the key's expiry
    /// to the persisted TAT, so idle and exhausted keys decay without an
    /// external reaper. Errors mean the backend was unreachable or
    /// misbehaved; they carry no quota verdict, and fail-open versus
    /// fail-closed is the caller's policy.
    async fn update(
        &self,
        key: &str,
        period: Duration,
        burst: u32,
        delta: f64,
    ) -> Result<UpdateResult, RateLimitError>;
}

/// In-memory backend for tests and single-process deployments.
///
/// Each key's read-modify-write happens under its [`DashMap`] entry lock, so
/// updates on the same key are atomic while distinct keys proceed fully in
/// parallel. The clock is injectable; the storage owns "now", callers never
/// supply it.
#[derive(Debug)]
pub struct MemoryStorage {
    buckets: DashMap<String, f64>,
    clock: Arc<dyn Clock>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            clock,
        }
    }

    /// Drop rows whose TAT already elapsed, mirroring the backend-native
    /// expiry of the Redis implementation. Call periodically in long-running
    /// processes to bound memory.
    pub fn sweep(&self) {
        let now = self.clock.now_millis() as f64;
        self.buckets.retain(|_, tat| *tat > now);
    }

    /// Number of live bucket rows, for monitoring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn update(
        &self,
        key: &str,
        period: Duration,
        burst: u32,
        delta: f64,
    ) -> Result<UpdateResult, RateLimitError> {
        let now = self.clock.now_millis() as f64;

        // The entry guard holds the shard lock for the whole decision.
        let outcome = match self.buckets.entry(key.to_owned()) {
            Entry::Occupied(mut entry) => {
                // An elapsed TAT is equivalent to an expired row.
                let stored = Some(*entry.get()).filter(|tat| *tat > now);
                let outcome = gcra::apply(stored, now, period, burst, delta);
                if let Some(tat) = outcome.new_tat {
                    *entry.get_mut() = tat;
                }
                outcome
            }
            Entry::Vacant(entry) => {
                let outcome = gcra::apply(None, now, period, burst, delta);
                if let Some(tat) = outcome.new_tat {
                    entry.insert(tat);
                }
                outcome
            }
        };

        Ok(UpdateResult {
            conforming: outcome.conforming,
            time_to_act: outcome.time_to_act.ceil() as EpochMillis,
        })
    }
}
