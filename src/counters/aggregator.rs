use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::{DayKey, EngagementTotals, Metric, Result};
use crate::storage::Store;

/// Periodic fan-in of shard values into the profile's canonical totals.
pub struct Aggregator {
    store: Arc<Store>,
}

impl Aggregator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Sum every shard of every metric for `day` and overwrite the profile's
    /// totals with the result.
    ///
    /// Idempotent: with no intervening increments a re-run writes the same
    /// totals. Reads race freely with concurrent increments; a delta landing
    /// mid-pass is picked up by the next one. Totals are only ever replaced
    /// wholesale here, never incremented in place.
    pub async fn aggregate(&self, day: DayKey) -> Result<EngagementTotals> {
        let shards = self.store.day_shards(day).await?;
        let profile = self.store.profile(day).await?;

        let mut totals = EngagementTotals::default();
        for metric in Metric::ALL {
            totals.set(metric, shards.sum(metric));
        }

        profile.update(|p| p.totals = totals).await;
        debug!(%day, views = totals.views, hearts = totals.hearts, crosses = totals.crosses,
            "aggregated shard counters");
        Ok(totals)
    }

    /// One aggregation pass against `day`, swallowing failures.
    ///
    /// Losing a cycle is non-fatal; the next tick self-heals.
    pub async fn aggregate_logged(&self, day: DayKey) {
        if let Err(e) = self.aggregate(day).await {
            warn!(%day, error = %e, "aggregation pass skipped");
        }
    }
}
