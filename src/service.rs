//! Facade consumed by the boundary layers (HTTP, trigger clock, identity
//! provider). Bid and content writes come back as structured outcomes with a
//! stable reason vocabulary; raw errors never cross this surface.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::auction::{Auction, AuctionEngine};
use crate::clock::Clock;
use crate::config::Config;
use crate::core::{DayKey, Error, Metric, ProfileContent, Result};
use crate::counters::{Aggregator, ShardStore};
use crate::lifecycle::LifecycleCoordinator;
use crate::profile::{Profile, ProfileRegistry};
use crate::storage::Store;
use crate::users::UserDirectory;

/// Finite reason vocabulary surfaced to callers on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidBid,
    BidTooLow,
    AuctionClosed,
    NotFound,
    Conflict,
    Unauthorized,
    Validation,
    Unavailable,
}

impl From<&Error> for RejectReason {
    fn from(e: &Error) -> Self {
        match e {
            Error::InvalidBid(_) => RejectReason::InvalidBid,
            Error::BidTooLow { .. } => RejectReason::BidTooLow,
            Error::AuctionClosed(_) => RejectReason::AuctionClosed,
            Error::NotFound(_) => RejectReason::NotFound,
            Error::Conflict(_) => RejectReason::Conflict,
            Error::Unauthorized(_) => RejectReason::Unauthorized,
            Error::Validation(_) => RejectReason::Validation,
            Error::Unavailable(_) | Error::Internal(_) => RejectReason::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct IncrementOutcome {
    pub accepted: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BidOutcome {
    pub accepted: bool,
    pub reason: Option<RejectReason>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContentOutcome {
    pub accepted: bool,
    pub reason: Option<RejectReason>,
}

/// The assembled service.
pub struct Spotlight {
    store: Arc<Store>,
    shard_store: ShardStore,
    aggregator: Aggregator,
    registry: Arc<ProfileRegistry>,
    engine: Arc<AuctionEngine>,
    users: UserDirectory,
    lifecycle: LifecycleCoordinator,
    clock: Arc<dyn Clock>,
}

impl Spotlight {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(Store::new(config.shard_count));
        let registry = Arc::new(ProfileRegistry::new(Arc::clone(&store)));
        let engine = Arc::new(AuctionEngine::new(
            Arc::clone(&store),
            config.max_bid_retries,
        ));
        let lifecycle = LifecycleCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&engine),
            Arc::clone(&clock),
        );
        Self {
            shard_store: ShardStore::new(Arc::clone(&store)),
            aggregator: Aggregator::new(Arc::clone(&store)),
            users: UserDirectory::new(Arc::clone(&store)),
            registry,
            engine,
            lifecycle,
            store,
            clock,
        }
    }

    /// Record one engagement event against today's profile.
    ///
    /// Best effort: a ping landing before today is provisioned (or after the
    /// caller's clock drifted past rollover) is dropped, and callers are
    /// contractually free to ignore the outcome.
    pub async fn increment_metric(&self, metric: Metric) -> IncrementOutcome {
        let day = self.clock.today();
        match self.shard_store.increment(metric, day, 1).await {
            Ok(()) => IncrementOutcome { accepted: true },
            Err(e) => {
                debug!(metric = metric.as_str(), %day, error = %e, "engagement ping dropped");
                IncrementOutcome { accepted: false }
            }
        }
    }

    /// Bid on the currently open auction.
    pub async fn place_bid(&self, caller: &str, amount: u64) -> BidOutcome {
        let Some(day) = self.store.current().await.auction_day else {
            return BidOutcome {
                accepted: false,
                reason: Some(RejectReason::AuctionClosed),
            };
        };
        match self.engine.bid(day, caller, amount).await {
            Ok(()) => BidOutcome {
                accepted: true,
                reason: None,
            },
            Err(e) => {
                debug!(%day, user = %caller, amount, error = %e, "bid rejected");
                BidOutcome {
                    accepted: false,
                    reason: Some((&e).into()),
                }
            }
        }
    }

    /// Overwrite the current profile's content; winners only.
    pub async fn set_profile_content(
        &self,
        caller: &str,
        content: ProfileContent,
    ) -> ContentOutcome {
        let Some(day) = self.store.current().await.profile_day else {
            return ContentOutcome {
                accepted: false,
                reason: Some(RejectReason::NotFound),
            };
        };
        match self.registry.set_content(day, caller, content).await {
            Ok(()) => ContentOutcome {
                accepted: true,
                reason: None,
            },
            Err(e) => {
                debug!(%day, user = %caller, error = %e, "content write rejected");
                ContentOutcome {
                    accepted: false,
                    reason: Some((&e).into()),
                }
            }
        }
    }

    /// Snapshot of the current profile for boundary reads.
    pub async fn current_profile(&self) -> Option<Profile> {
        self.registry.current().await
    }

    // ---- trigger entry points (external clock; outcomes logged, not returned)

    pub async fn on_daily_rollover(&self) {
        if let Err(e) = self.lifecycle.daily_rollover().await {
            error!(error = %e, "daily rollover failed");
        }
    }

    pub async fn on_auction_open(&self) {
        if let Err(e) = self.lifecycle.auction_open().await {
            error!(error = %e, "auction open failed");
        }
    }

    pub async fn on_auction_close(&self) {
        match self.lifecycle.auction_close().await {
            Ok(Some(outcome)) => info!(?outcome, "auction close trigger handled"),
            Ok(None) => {}
            Err(e) => error!(error = %e, "auction close failed"),
        }
    }

    /// One aggregation pass against the current day; failures are swallowed.
    pub async fn on_aggregate_tick(&self) {
        let day = self.clock.today();
        self.aggregator.aggregate_logged(day).await;
    }

    // ---- identity provider hooks

    pub async fn on_user_created(&self, id: &str) {
        self.users.create(id).await;
    }

    pub async fn on_user_deleted(&self, id: &str) {
        self.users.delete(id).await;
    }

    // ---- direct component access for boundary reads and tests

    pub fn lifecycle(&self) -> &LifecycleCoordinator {
        &self.lifecycle
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub async fn profile(&self, day: DayKey) -> Result<Profile> {
        self.registry.get(day).await
    }

    pub async fn auction(&self, day: DayKey) -> Result<Auction> {
        self.engine.get(day).await
    }

    /// A user's standing in the auction keyed by `day`.
    pub async fn participation(
        &self,
        id: &str,
        day: DayKey,
    ) -> Result<Option<crate::users::Participation>> {
        self.users.participation(id, day).await
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
