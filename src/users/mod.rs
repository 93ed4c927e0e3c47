//! User directory and per-day auction participation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{DayKey, Result};
use crate::storage::Store;

/// A user's standing in one day's auction, keyed by that auction's day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub latest_bid: u64,
    pub is_winner: bool,
}

/// One record per identity. Created on signup, removed on account deletion.
#[derive(Debug, Clone, Default)]
pub struct UserRecord {
    pub participation: HashMap<DayKey, Participation>,
}

/// Signup/deletion surface invoked by the external identity provider.
pub struct UserDirectory {
    store: Arc<Store>,
}

impl UserDirectory {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, id: &str) {
        if self.store.create_user(id).await {
            info!(user = %id, "user record created");
        }
    }

    pub async fn delete(&self, id: &str) {
        if self.store.remove_user(id).await {
            info!(user = %id, "user record removed");
        }
    }

    /// The caller's participation record for `day`, if any.
    pub async fn participation(&self, id: &str, day: DayKey) -> Result<Option<Participation>> {
        let cell = self.store.user(id).await?;
        Ok(cell.read(|u| u.participation.get(&day).copied()).await)
    }
}
