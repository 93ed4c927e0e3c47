use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Opaque identity handed to us by the external identity provider.
pub type UserId = String;

/// Calendar date in the rotation's fixed time zone.
///
/// A day key is the identity binding one profile, one auction and their
/// sub-records. Rendered as `M-D-YYYY` without zero padding (e.g. `2-24-2020`),
/// the same form the entities are keyed by everywhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

/// Rotation time zone: PST as a fixed UTC-8 offset, no DST.
const ROTATION_OFFSET_SECS: i32 = -8 * 3600;

fn rotation_offset() -> FixedOffset {
    FixedOffset::east_opt(ROTATION_OFFSET_SECS).expect("rotation offset is in range")
}

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Derive the day key for a UTC instant by shifting into rotation time.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.with_timezone(&rotation_offset()).date_naive())
    }

    /// The UTC instant at which this day begins in rotation time.
    pub fn rotation_start_utc(&self) -> DateTime<Utc> {
        self.0
            .and_time(chrono::NaiveTime::MIN)
            .and_local_timezone(rotation_offset())
            .single()
            .expect("fixed offset has no ambiguous local times")
            .with_timezone(&Utc)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + Days::new(1))
    }

    pub fn prev(self) -> Self {
        Self(self.0 - Days::new(1))
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.0.month(), self.0.day(), self.0.year())
    }
}

/// Engagement metrics tracked on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    View,
    Heart,
    Cross,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::View, Metric::Heart, Metric::Cross];

    /// Stable position of this metric in per-day shard rows and totals.
    pub fn index(self) -> usize {
        match self {
            Metric::View => 0,
            Metric::Heart => 1,
            Metric::Cross => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::View => "view",
            Metric::Heart => "heart",
            Metric::Cross => "cross",
        }
    }
}

/// Canonical totals on a profile. Only the aggregator writes these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementTotals {
    pub views: u64,
    pub hearts: u64,
    pub crosses: u64,
}

impl EngagementTotals {
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::View => self.views,
            Metric::Heart => self.hearts,
            Metric::Cross => self.crosses,
        }
    }

    pub fn set(&mut self, metric: Metric, value: u64) {
        match metric {
            Metric::View => self.views = value,
            Metric::Heart => self.hearts = value,
            Metric::Cross => self.crosses = value,
        }
    }
}

pub const MAX_PANELS: usize = 3;

/// One labeled link/media/text triple on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub label: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Panel {
    fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::Validation("panel label must not be empty".into()));
        }
        if self.link.is_none() && self.media.is_none() && self.text.is_none() {
            return Err(Error::Validation(format!(
                "panel '{}' must carry a link, media or text",
                self.label
            )));
        }
        for url in [&self.link, &self.media].into_iter().flatten() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Validation(format!(
                    "panel '{}' has a malformed url: {}",
                    self.label, url
                )));
            }
        }
        Ok(())
    }
}

/// Editable content of a profile. The auction winner overwrites this once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileContent {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub panels: Vec<Panel>,
}

impl ProfileContent {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title must not be empty".into()));
        }
        if self.panels.len() > MAX_PANELS {
            return Err(Error::Validation(format!(
                "at most {} panels allowed, got {}",
                MAX_PANELS,
                self.panels.len()
            )));
        }
        if let Some(url) = &self.image_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            return Err(Error::Validation(format!("malformed image url: {url}")));
        }
        for panel in &self.panels {
            panel.validate()?;
        }
        Ok(())
    }
}

impl Default for ProfileContent {
    fn default() -> Self {
        Self {
            title: "Spotlight of the day".to_string(),
            image_url: None,
            panels: Vec::new(),
        }
    }
}
