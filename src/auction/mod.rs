//! Daily auction: time-windowed bidding with strict-increase acceptance.

pub mod engine;

use serde::{Deserialize, Serialize};

use crate::core::{DayKey, UserId};

pub use engine::{AuctionEngine, CloseOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Open,
    Closed { resolved: bool },
}

/// One accepted bid. Log position is acceptance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidEntry {
    pub amount: u64,
    pub bidder: UserId,
}

/// One day's auction. The winner earns a one-time content write on `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub date: DayKey,
    /// The day whose profile this auction's winner may edit.
    pub target: DayKey,
    pub status: AuctionStatus,
    /// Strictly increasing across accepted bids.
    pub top_bid: u64,
    /// Number of accepted bids; doubles as the next log index.
    pub bid_count: u64,
    /// Append-only, indexed 0..bid_count-1 in acceptance order.
    pub bids: Vec<BidEntry>,
}

impl Auction {
    pub fn new(date: DayKey, target: DayKey) -> Self {
        Self {
            date,
            target,
            status: AuctionStatus::Open,
            top_bid: 0,
            bid_count: 0,
            bids: Vec::new(),
        }
    }
}
