//! Wall-clock driver for the trigger entry points.
//!
//! The realization of the external Clock/Trigger collaborator: an aggregation
//! tick on a fixed interval, and the three day-boundary triggers fired around
//! the rotation midnight (close shortly before, rollover at, open shortly
//! after). Every trigger it fires is idempotent on the service side, so an
//! extra firing after a slow tick or restart is harmless.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::clock::Clock;
use crate::config::Config;
use crate::core::DayKey;
use crate::service::Spotlight;

pub struct Scheduler {
    service: Arc<Spotlight>,
    config: Config,
}

enum DayEvent {
    Open,
    Close,
    Rollover,
}

impl Scheduler {
    pub fn new(service: Arc<Spotlight>, config: Config) -> Self {
        Self { service, config }
    }

    /// Run until the shutdown signal flips.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let aggregate = self.aggregate_loop();
        let boundaries = self.day_boundary_loop();

        tokio::select! {
            _ = aggregate => {}
            _ = boundaries => {}
            _ = shutdown.changed() => info!("scheduler stopped"),
        }
    }

    async fn aggregate_loop(&self) {
        let mut tick = tokio::time::interval(self.config.aggregate_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick is immediate, which doubles as the
        // catch-up pass after a restart.
        loop {
            tick.tick().await;
            self.service.on_aggregate_tick().await;
        }
    }

    async fn day_boundary_loop(&self) {
        loop {
            let (event, wait) = self.next_day_event();
            tokio::time::sleep(wait).await;
            match event {
                DayEvent::Open => self.service.on_auction_open().await,
                DayEvent::Close => self.service.on_auction_close().await,
                DayEvent::Rollover => self.service.on_daily_rollover().await,
            }
        }
    }

    /// The next boundary trigger and how long until it fires.
    fn next_day_event(&self) -> (DayEvent, Duration) {
        let clock = self.service.clock();
        let now = clock.now_utc();
        let today = DayKey::from_utc(now);
        let next_midnight = today.next().rotation_start_utc();

        let open_at = today.rotation_start_utc()
            + chrono::Duration::from_std(self.config.auction_open_offset)
                .expect("open offset fits");
        let close_at = next_midnight
            - chrono::Duration::from_std(self.config.auction_close_lead)
                .expect("close lead fits");

        let (event, at) = if now < open_at {
            (DayEvent::Open, open_at)
        } else if now < close_at {
            (DayEvent::Close, close_at)
        } else {
            (DayEvent::Rollover, next_midnight)
        };
        let wait = (at - now).to_std().unwrap_or(Duration::ZERO);
        (event, wait)
    }
}
