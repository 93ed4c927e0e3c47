use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Auction, AuctionStatus, BidEntry};
use crate::core::{DayKey, Error, Result, UserId};
use crate::storage::Store;
use crate::users::Participation;

/// Terminal result of closing an auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Resolved { winner: UserId, amount: u64 },
    Unresolved,
}

/// State machine over per-day auction entities: `open`, `bid`, `close`.
pub struct AuctionEngine {
    store: Arc<Store>,
    max_bid_retries: u32,
}

impl AuctionEngine {
    pub fn new(store: Arc<Store>, max_bid_retries: u32) -> Self {
        Self {
            store,
            max_bid_retries,
        }
    }

    /// Open the auction for `day`, granting its winner edit rights on
    /// `target`. Re-delivery of the trigger is detected and skipped.
    pub async fn open(&self, day: DayKey, target: DayKey) -> Result<bool> {
        let created = self.store.create_auction(day, target).await;
        if created {
            info!(%day, %target, "auction opened");
        } else {
            info!(%day, "auction already open, trigger skipped");
        }
        Ok(created)
    }

    /// Place a bid: the five-step atomically-checked sequence.
    ///
    /// Optimistic protocol: validate against a snapshot, then commit inside
    /// an exclusive section only if the version is unchanged. A concurrent
    /// winner forces re-validation against its new top, so two bids can
    /// never both pass a stale strict-increase check. Sustained losses give
    /// up with `Conflict`.
    pub async fn bid(&self, day: DayKey, caller: &str, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidBid("bid amount must be positive".into()));
        }

        // An unknown bidder is a hard failure, unlike an engagement ping.
        let user = self.store.user(caller).await?;
        let cell = self
            .store
            .auction(day)
            .await
            .map_err(|_| Error::AuctionClosed(day.to_string()))?;

        for _ in 0..self.max_bid_retries {
            let snap = cell.snapshot().await;
            if snap.value.status != AuctionStatus::Open
                || self.store.current().await.auction_day != Some(day)
            {
                return Err(Error::AuctionClosed(day.to_string()));
            }
            if amount <= snap.value.top_bid {
                return Err(Error::BidTooLow {
                    amount,
                    top_bid: snap.value.top_bid,
                });
            }

            let mut write = cell.begin_write().await;
            if write.version() != snap.version {
                // Lost the race; observe the winning commit and re-validate.
                drop(write);
                continue;
            }

            write.mutate(|a| {
                a.bids.push(BidEntry {
                    amount,
                    bidder: caller.to_string(),
                });
                a.top_bid = amount;
                a.bid_count += 1;
            });
            // Participation upsert joins the same atomic unit: the auction
            // section is still held, so close() cannot interleave between
            // the log append and the permission record.
            user.update(|u| {
                u.participation.insert(
                    day,
                    Participation {
                        latest_bid: amount,
                        is_winner: false,
                    },
                );
            })
            .await;
            drop(write);

            debug!(%day, user = %caller, amount, "bid accepted");
            return Ok(());
        }

        Err(Error::Conflict(format!(
            "bid on {day} kept losing commit races after {} attempts",
            self.max_bid_retries
        )))
    }

    /// Close the auction for `day` and resolve its winner.
    ///
    /// With no accepted bids the terminal state is unresolved and nobody is
    /// granted permission. Otherwise the log tail is the unique highest bid
    /// and its bidder's participation record becomes the permission record.
    /// Closing an already-closed auction returns the prior outcome.
    pub async fn close(&self, day: DayKey) -> Result<CloseOutcome> {
        let cell = self.store.auction(day).await?;
        let mut write = cell.begin_write().await;

        if let AuctionStatus::Closed { resolved } = write.get().status {
            return Ok(Self::terminal_outcome(write.get(), resolved));
        }

        if write.get().bids.is_empty() {
            write.mutate(|a| a.status = AuctionStatus::Closed { resolved: false });
            drop(write);
            self.store.clear_current_auction(day).await;
            info!(%day, "auction closed with no bids, unresolved");
            return Ok(CloseOutcome::Unresolved);
        }

        let tail = write
            .get()
            .bids
            .last()
            .cloned()
            .expect("non-empty bid log has a tail");
        let highest = write
            .get()
            .bids
            .iter()
            .map(|b| b.amount)
            .max()
            .expect("non-empty bid log has a maximum");
        if tail.amount != highest || tail.amount != write.get().top_bid {
            // Strict-increase acceptance guarantees the tail is the maximum;
            // a mismatch is corrupted state, not something to scan around.
            return Err(Error::Internal(format!(
                "auction {day} bid log tail {} disagrees with top {} / max {}",
                tail.amount,
                write.get().top_bid,
                highest
            )));
        }

        write.mutate(|a| a.status = AuctionStatus::Closed { resolved: true });
        match self.store.user(&tail.bidder).await {
            Ok(winner) => {
                winner
                    .update(|u| {
                        u.participation.entry(day).or_default().is_winner = true;
                    })
                    .await;
            }
            // The account vanished between bidding and close; the auction
            // still terminates, the permission simply has no home.
            Err(_) => warn!(%day, user = %tail.bidder, "winner account no longer exists"),
        }
        drop(write);
        self.store.clear_current_auction(day).await;

        info!(%day, winner = %tail.bidder, amount = tail.amount, "auction resolved");
        Ok(CloseOutcome::Resolved {
            winner: tail.bidder,
            amount: tail.amount,
        })
    }

    /// Snapshot accessor for boundary reads and tests.
    pub async fn get(&self, day: DayKey) -> Result<Auction> {
        Ok(self.store.auction(day).await?.snapshot().await.value)
    }

    fn terminal_outcome(auction: &Auction, resolved: bool) -> CloseOutcome {
        if resolved
            && let Some(tail) = auction.bids.last()
        {
            CloseOutcome::Resolved {
                winner: tail.bidder.clone(),
                amount: tail.amount,
            }
        } else {
            CloseOutcome::Unresolved
        }
    }
}
