//! Injected time source.
//!
//! Business logic never reads the wall clock directly; every component takes a
//! [`Clock`] and derives day keys from it. Tests pin time with [`FixedClock`].

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::core::DayKey;

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Day key for the current instant in rotation time.
    fn today(&self) -> DayKey {
        DayKey::from_utc(self.now_utc())
    }
}

/// Real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(instant)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = instant;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}
