//! Opening-hours-aware filtering with fallback relaxation.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::opening_hours::OpeningHours;
use super::place::Candidate;
use super::time_bucket::{BucketConvention, TimeBucket};

/// How the temporal filter treated a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// No bucket was requested.
    Unfiltered,
    /// The bucket filter was applied and kept at least one place.
    Strict,
    /// The bucket filter kept nothing, so every candidate was returned.
    Relaxed,
}

impl FilterMode {
    /// `false` only when filtering was relaxed.
    #[must_use]
    pub const fn was_strict(self) -> bool {
        !matches!(self, Self::Relaxed)
    }

    /// Whether the returned places were actually narrowed by time.
    #[must_use]
    pub const fn filtered_by_time(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Filtered candidates and the mode that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalOutcome {
    /// Surviving candidates in their original order.
    pub candidates: Vec<Candidate>,
    /// Filter mode reported to callers.
    pub mode: FilterMode,
}

/// Applies a time bucket to candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalFilter {
    convention: BucketConvention,
}

impl TemporalFilter {
    /// Create a filter using `convention` for bucket hours.
    #[must_use]
    pub const fn new(convention: BucketConvention) -> Self {
        Self { convention }
    }

    /// Filter `candidates` for `bucket` at the local instant `now`.
    ///
    /// Places without declared hours, or with hours that do not parse, always
    /// pass. When strict filtering leaves nothing but there was something to
    /// filter, the unfiltered set comes back with [`FilterMode::Relaxed`].
    #[must_use]
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        bucket: Option<TimeBucket>,
        now: NaiveDateTime,
    ) -> TemporalOutcome {
        let Some(bucket) = bucket else {
            return TemporalOutcome {
                candidates,
                mode: FilterMode::Unfiltered,
            };
        };

        let hour_in_bucket = bucket.contains_hour(now.hour(), self.convention);
        let strict: Vec<Candidate> = candidates
            .iter()
            .filter(|candidate| admits(candidate, hour_in_bucket, now))
            .cloned()
            .collect();

        if strict.is_empty() && !candidates.is_empty() {
            debug!(
                bucket = bucket.as_str(),
                candidates = candidates.len(),
                "temporal filter relaxed"
            );
            return TemporalOutcome {
                candidates,
                mode: FilterMode::Relaxed,
            };
        }

        TemporalOutcome {
            candidates: strict,
            mode: FilterMode::Strict,
        }
    }
}

fn admits(candidate: &Candidate, hour_in_bucket: bool, now: NaiveDateTime) -> bool {
    let Some(raw) = candidate.place.opening_hours.as_deref() else {
        return true;
    };
    match OpeningHours::parse(raw) {
        Ok(hours) => hour_in_bucket && hours.is_open_at(now),
        Err(error) => {
            debug!(place = %candidate.place.id, %error, "ignoring malformed opening hours");
            true
        }
    }
}
