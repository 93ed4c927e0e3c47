use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::cell::VersionedCell;
use super::shards::DayShards;
use crate::auction::Auction;
use crate::core::{DayKey, Error, ProfileContent, Result, UserId};
use crate::profile::Profile;
use crate::users::UserRecord;

/// Process-wide pointer naming the current profile and auction days.
///
/// Exactly one profile (and at most one auction) is current at any time; the
/// pointer is flipped inside the same exclusive section that creates the
/// incoming entity, so there is no window with zero or two current entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentPointer {
    pub profile_day: Option<DayKey>,
    pub auction_day: Option<DayKey>,
}

/// Day-keyed record store.
///
/// Each entity lives in its own cell so independent records never contend.
/// Creation is gated on existence: lifecycle triggers are delivered at least
/// once, and a re-run must never overwrite live counters or bids.
pub struct Store {
    shard_count: usize,
    profiles: RwLock<HashMap<DayKey, Arc<VersionedCell<Profile>>>>,
    shards: RwLock<HashMap<DayKey, Arc<DayShards>>>,
    auctions: RwLock<HashMap<DayKey, Arc<VersionedCell<Auction>>>>,
    users: RwLock<HashMap<UserId, Arc<VersionedCell<UserRecord>>>>,
    current: VersionedCell<CurrentPointer>,
}

impl Store {
    pub fn new(shard_count: usize) -> Self {
        Self {
            shard_count,
            profiles: RwLock::new(HashMap::new()),
            shards: RwLock::new(HashMap::new()),
            auctions: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            current: VersionedCell::new(CurrentPointer::default()),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Provision a day: profile entity plus its shard row, and flip the
    /// current-profile pointer. Returns `false` if the day already exists,
    /// leaving all its state untouched.
    pub async fn create_day(&self, day: DayKey, content: ProfileContent) -> bool {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&day) {
            return false;
        }
        profiles.insert(day, Arc::new(VersionedCell::new(Profile::new(day, content))));
        self.shards
            .write()
            .await
            .insert(day, Arc::new(DayShards::new(self.shard_count)));
        // Pointer flips while the profiles table is still held exclusively.
        self.current.update(|c| c.profile_day = Some(day)).await;
        true
    }

    pub async fn profile(&self, day: DayKey) -> Result<Arc<VersionedCell<Profile>>> {
        self.profiles
            .read()
            .await
            .get(&day)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("profile {day}")))
    }

    pub async fn day_shards(&self, day: DayKey) -> Result<Arc<DayShards>> {
        self.shards
            .read()
            .await
            .get(&day)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("shards {day}")))
    }

    /// Create the auction entity for `day` and point the current-auction
    /// pointer at it. Returns `false` if it already exists.
    pub async fn create_auction(&self, day: DayKey, target: DayKey) -> bool {
        let mut auctions = self.auctions.write().await;
        if auctions.contains_key(&day) {
            return false;
        }
        auctions.insert(day, Arc::new(VersionedCell::new(Auction::new(day, target))));
        self.current.update(|c| c.auction_day = Some(day)).await;
        true
    }

    pub async fn auction(&self, day: DayKey) -> Result<Arc<VersionedCell<Auction>>> {
        self.auctions
            .read()
            .await
            .get(&day)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("auction {day}")))
    }

    /// Demote `day` from current-auction status, if it still holds it.
    pub async fn clear_current_auction(&self, day: DayKey) {
        self.current
            .update(|c| {
                if c.auction_day == Some(day) {
                    c.auction_day = None;
                }
            })
            .await;
    }

    pub async fn current(&self) -> CurrentPointer {
        self.current.snapshot().await.value
    }

    /// Returns `false` if the user already exists.
    pub async fn create_user(&self, id: &str) -> bool {
        let mut users = self.users.write().await;
        if users.contains_key(id) {
            return false;
        }
        users.insert(
            id.to_string(),
            Arc::new(VersionedCell::new(UserRecord::default())),
        );
        true
    }

    /// Returns `false` if the user was not present.
    pub async fn remove_user(&self, id: &str) -> bool {
        self.users.write().await.remove(id).is_some()
    }

    pub async fn user(&self, id: &str) -> Result<Arc<VersionedCell<UserRecord>>> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }
}
