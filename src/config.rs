use std::time::Duration;

/// Runtime tunables.
///
/// Defaults match the production cadence: ten shards per metric, a five
/// minute aggregation tick, and auction open/close five minutes off the
/// rotation midnight.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shards per metric per day.
    pub shard_count: usize,

    /// How often shard values are folded into the canonical totals.
    pub aggregate_interval: Duration,

    /// Commit-race retries before a bid gives up with a conflict.
    pub max_bid_retries: u32,

    /// Auction opens this long after the rotation midnight.
    pub auction_open_offset: Duration,

    /// Auction closes this long before the next rotation midnight.
    pub auction_close_lead: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: 10,
            aggregate_interval: Duration::from_secs(300),
            max_bid_retries: 5,
            auction_open_offset: Duration::from_secs(300),
            auction_close_lead: Duration::from_secs(300),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards per metric
    pub fn shard_count(mut self, count: usize) -> Self {
        self.shard_count = count;
        self
    }

    /// Set the aggregation cadence
    pub fn aggregate_interval(mut self, interval: Duration) -> Self {
        self.aggregate_interval = interval;
        self
    }

    /// Set the bid retry budget
    pub fn max_bid_retries(mut self, retries: u32) -> Self {
        self.max_bid_retries = retries;
        self
    }
}
