//! Profile registry: one entity per day, rotated at day boundaries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{DayKey, EngagementTotals, Error, ProfileContent, Result, UserId};
use crate::storage::Store;
use crate::users::UserDirectory;

/// One day's profile. Never deleted; superseded days stay as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub date: DayKey,
    /// Whether the auction winner has submitted custom content.
    pub is_set: bool,
    pub content: ProfileContent,
    pub totals: EngagementTotals,
}

impl Profile {
    pub fn new(date: DayKey, content: ProfileContent) -> Self {
        Self {
            date,
            is_set: false,
            content,
            totals: EngagementTotals::default(),
        }
    }
}

pub struct ProfileRegistry {
    store: Arc<Store>,
    users: UserDirectory,
}

impl ProfileRegistry {
    pub fn new(store: Arc<Store>) -> Self {
        let users = UserDirectory::new(Arc::clone(&store));
        Self { store, users }
    }

    /// Provision `day`: default-content profile, zeroed shards, pointer flip.
    ///
    /// Safe under at-least-once trigger delivery; a re-run for an existing
    /// day is detected and skipped without touching live counters.
    pub async fn create_daily(&self, day: DayKey) -> Result<bool> {
        let created = self.store.create_day(day, ProfileContent::default()).await;
        if created {
            info!(%day, "profile provisioned, now current");
        } else {
            info!(%day, "profile already provisioned, rollover skipped");
        }
        Ok(created)
    }

    /// Sole content-mutation path.
    ///
    /// Permission belongs to the resolved winner of the auction targeting
    /// `day`, which by construction ran the day before. The winner's
    /// participation record is the permission record.
    pub async fn set_content(
        &self,
        day: DayKey,
        caller: &str,
        content: ProfileContent,
    ) -> Result<()> {
        content.validate()?;

        let auction_day = day.prev();
        let winner = self
            .users
            .participation(caller, auction_day)
            .await
            .ok()
            .flatten()
            .is_some_and(|p| p.is_winner);
        if !winner {
            return Err(Error::Unauthorized(format!(
                "{caller} did not win the auction for {day}"
            )));
        }

        let profile = self.store.profile(day).await?;
        profile
            .update(|p| {
                p.content = content;
                p.is_set = true;
            })
            .await;
        info!(%day, user = %caller, "winner content applied");
        Ok(())
    }

    /// Snapshot of the current day's profile, if one has been provisioned.
    pub async fn current(&self) -> Option<Profile> {
        let day = self.store.current().await.profile_day?;
        let cell = self.store.profile(day).await.ok()?;
        Some(cell.snapshot().await.value)
    }

    pub async fn get(&self, day: DayKey) -> Result<Profile> {
        Ok(self.store.profile(day).await?.snapshot().await.value)
    }
}
