// ============================================================================
// Spotlight Library
// ============================================================================
//! Daily spotlight rotation: a profile of the day with sharded engagement
//! counters and a daily auction whose winner sets the next day's content.
//!
//! Two mechanisms carry the engineering weight. Engagement events land on
//! sharded counters, one uniformly-chosen atomic add per event, so arbitrary
//! concurrency never serializes on a single record; a periodic aggregator
//! fans the shards back into canonical totals. Bids go through a
//! strict-increase state machine whose five-step acceptance sequence commits
//! as one atomic unit under optimistic versioning, so two racing bids can
//! never both pass a stale top-bid check.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use spotlight::{Config, FixedClock, Metric, Spotlight};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let clock = FixedClock::at("2020-02-24T18:00:00Z".parse().unwrap());
//! let service = Arc::new(Spotlight::new(&Config::default(), Arc::new(clock)));
//!
//! // Day boundary triggers provision today and open its auction.
//! service.on_daily_rollover().await;
//! service.on_auction_open().await;
//!
//! service.on_user_created("ada").await;
//! let outcome = service.place_bid("ada", 50).await;
//! assert!(outcome.accepted);
//!
//! service.increment_metric(Metric::Heart).await;
//! service.on_aggregate_tick().await;
//! # }
//! ```

pub mod auction;
pub mod clock;
pub mod config;
pub mod core;
pub mod counters;
pub mod lifecycle;
pub mod profile;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod users;

// Re-export main types for convenience
pub use crate::core::{
    DayKey, EngagementTotals, Error, Metric, Panel, ProfileContent, Result, UserId,
};
pub use auction::{Auction, AuctionStatus, BidEntry, CloseOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use profile::Profile;
pub use scheduler::Scheduler;
pub use service::{BidOutcome, ContentOutcome, IncrementOutcome, RejectReason, Spotlight};
pub use users::Participation;
