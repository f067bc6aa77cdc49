//! Coarse time-of-day buckets.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::category::normalise_dictionary_token;

/// Morning, afternoon, or evening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    /// Before noon.
    Morning,
    /// Noon until 18:00.
    Afternoon,
    /// 18:00 until midnight.
    Evening,
}

/// Where the morning bucket starts.
///
/// Both conventions agree on afternoon `[12, 18)` and evening `[18, 24)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketConvention {
    /// Morning is `[0, 12)`.
    #[default]
    Midnight,
    /// Morning is `[6, 12)`; hours before 06:00 belong to no bucket.
    Dawn,
}

impl FromStr for BucketConvention {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "midnight" => Ok(Self::Midnight),
            "dawn" => Ok(Self::Dawn),
            other => Err(format!("unknown bucket convention '{other}'")),
        }
    }
}

impl TimeBucket {
    /// Every bucket, in chronological order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Parse a request token, accepting English and Spanish names.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::TimeBucket;
    ///
    /// assert_eq!(TimeBucket::parse("Mañana"), Some(TimeBucket::Morning));
    /// assert_eq!(TimeBucket::parse("noche"), Some(TimeBucket::Evening));
    /// assert_eq!(TimeBucket::parse("brunch"), None);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalise_dictionary_token(raw).as_str() {
            "morning" | "manana" => Some(Self::Morning),
            "afternoon" | "tarde" => Some(Self::Afternoon),
            "evening" | "night" | "noche" => Some(Self::Evening),
            _ => None,
        }
    }

    /// Hour range `[start, end)` for this bucket.
    #[must_use]
    pub const fn hours(self, convention: BucketConvention) -> Range<u32> {
        match (self, convention) {
            (Self::Morning, BucketConvention::Midnight) => 0..12,
            (Self::Morning, BucketConvention::Dawn) => 6..12,
            (Self::Afternoon, _) => 12..18,
            (Self::Evening, _) => 18..24,
        }
    }

    /// Whether `hour` (0..24) falls inside the bucket.
    #[must_use]
    pub fn contains_hour(self, hour: u32, convention: BucketConvention) -> bool {
        self.hours(convention).contains(&hour)
    }

    /// Lowercase canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
