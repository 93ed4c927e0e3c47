//! Day-boundary transitions, driven by the external trigger clock.
//!
//! Triggers are delivered at least once with no ordering between kinds, so
//! every transition re-checks state before acting: creation is gated on
//! existence and close follows the current-auction pointer instead of
//! recomputing the day from the clock, which keeps a late-delivered close
//! aimed at the right auction.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auction::{AuctionEngine, CloseOutcome};
use crate::clock::Clock;
use crate::core::Result;
use crate::profile::ProfileRegistry;
use crate::storage::Store;

pub struct LifecycleCoordinator {
    store: Arc<Store>,
    registry: Arc<ProfileRegistry>,
    engine: Arc<AuctionEngine>,
    clock: Arc<dyn Clock>,
}

impl LifecycleCoordinator {
    pub fn new(
        store: Arc<Store>,
        registry: Arc<ProfileRegistry>,
        engine: Arc<AuctionEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            engine,
            clock,
        }
    }

    /// Provision the new day's profile and shards; demotes the previous
    /// day's profile by flipping the current pointer.
    pub async fn daily_rollover(&self) -> Result<bool> {
        let day = self.clock.today();
        self.registry.create_daily(day).await
    }

    /// Open today's auction, targeting tomorrow's profile.
    ///
    /// If the outgoing day's close trigger never arrived, its auction is
    /// still current; resolve it here before the pointer moves on.
    pub async fn auction_open(&self) -> Result<bool> {
        let day = self.clock.today();
        if let Some(stale) = self.store.current().await.auction_day
            && stale != day
        {
            warn!(%stale, "closing auction left over from a missed trigger");
            self.engine.close(stale).await?;
        }
        self.engine.open(day, day.next()).await
    }

    /// Close whichever auction is current and resolve its winner.
    ///
    /// A re-delivered or early trigger with no current auction is a no-op.
    pub async fn auction_close(&self) -> Result<Option<CloseOutcome>> {
        let Some(day) = self.store.current().await.auction_day else {
            info!("no current auction to close");
            return Ok(None);
        };
        Ok(Some(self.engine.close(day).await?))
    }
}
