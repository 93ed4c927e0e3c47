pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    DayKey, EngagementTotals, MAX_PANELS, Metric, Panel, ProfileContent, UserId,
};
