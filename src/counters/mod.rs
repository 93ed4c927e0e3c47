//! Sharded engagement counters.
//!
//! Increments are fire-and-forget: a request picks one of the day's shards
//! uniformly at random and applies a single atomic add, so any number of
//! concurrent engagement events proceed without a contention point. The
//! [`Aggregator`] periodically fans the shards back in to the profile's
//! canonical totals.

pub mod aggregator;

use std::sync::Arc;

use rand::Rng;

use crate::core::{DayKey, Metric, Result};
use crate::storage::Store;

pub use aggregator::Aggregator;

/// Increment surface over the day's shard rows.
pub struct ShardStore {
    store: Arc<Store>,
}

impl ShardStore {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Add `delta` to one uniformly-chosen shard of `metric` for `day`.
    ///
    /// No read happens and no caller observes a partial shard value. Fails
    /// with `NotFound` when the day was never provisioned; callers are free
    /// to drop that outcome, a ping straddling rollover is a tolerable loss.
    pub async fn increment(&self, metric: Metric, day: DayKey, delta: u64) -> Result<()> {
        let shards = self.store.day_shards(day).await?;
        let shard = rand::thread_rng().gen_range(0..shards.shard_count());
        shards.add(metric, shard, delta);
        Ok(())
    }
}
