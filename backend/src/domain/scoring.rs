//! Relevance scoring strategies and the ranking order.
//!
//! Scorers are pure: the same candidate and context always produce the same
//! score. Ranking sorts by score descending, breaks ties by ascending distance,
//! keeps provider order otherwise, and truncates only after sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::opening_hours::OpeningHours;
use super::place::{Candidate, Place};
use super::tags::has_any;
use super::time_bucket::{BucketConvention, TimeBucket};

/// Tag groups counted once each for completeness.
const COMPLETENESS_FIELDS: &[&[&str]] = &[
    &["phone", "contact:phone"],
    &["opening_hours"],
    &["website", "contact:website", "url"],
    &["description"],
    &["email", "contact:email"],
    &["wheelchair"],
    &["image"],
];

/// Tags whose presence marks a place as strongly on-category.
pub const SIGNAL_TAGS: &[&str] = &["tourism", "historic", "leisure", "amenity"];

/// Request-level inputs a scorer may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringContext {
    /// Requested bucket, if any.
    pub bucket: Option<TimeBucket>,
    /// Bucket hour convention.
    pub convention: BucketConvention,
}

/// Pluggable relevance scoring strategy.
#[cfg_attr(test, mockall::automock)]
pub trait PlaceScorer: Send + Sync {
    /// Score one candidate; higher is more relevant.
    fn score(&self, candidate: &Candidate, context: &ScoringContext) -> u32;
}

/// One point per completeness field present.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineScorer;

impl PlaceScorer for BaselineScorer {
    fn score(&self, candidate: &Candidate, _context: &ScoringContext) -> u32 {
        completeness(candidate)
    }
}

fn completeness(candidate: &Candidate) -> u32 {
    let address = u32::from(candidate.place.address.is_some());
    let fields = COMPLETENESS_FIELDS
        .iter()
        .filter(|keys| has_any(&candidate.tags, keys))
        .count();
    address + u32::try_from(fields).unwrap_or(u32::MAX)
}

/// Completeness plus weighted category signals and a bucket bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichedScorer {
    signal_weight: u32,
    bucket_bonus: u32,
}

impl Default for EnrichedScorer {
    fn default() -> Self {
        Self {
            signal_weight: 2,
            bucket_bonus: 3,
        }
    }
}

impl EnrichedScorer {
    /// Create a scorer with explicit weights.
    #[must_use]
    pub const fn new(signal_weight: u32, bucket_bonus: u32) -> Self {
        Self {
            signal_weight,
            bucket_bonus,
        }
    }
}

impl PlaceScorer for EnrichedScorer {
    fn score(&self, candidate: &Candidate, context: &ScoringContext) -> u32 {
        let signals = SIGNAL_TAGS
            .iter()
            .filter(|key| has_any(&candidate.tags, &[**key]))
            .count();
        let signals = u32::try_from(signals).unwrap_or(u32::MAX);

        let bucket_match = context.bucket.is_some_and(|bucket| {
            candidate
                .place
                .opening_hours
                .as_deref()
                .and_then(|raw| OpeningHours::parse(raw).ok())
                .is_some_and(|hours| hours.overlaps_bucket(bucket, context.convention))
        });

        completeness(candidate)
            .saturating_add(signals.saturating_mul(self.signal_weight))
            .saturating_add(if bucket_match { self.bucket_bonus } else { 0 })
    }
}

/// Configured scoring strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringTier {
    /// [`BaselineScorer`].
    Baseline,
    /// [`EnrichedScorer`].
    #[default]
    Enriched,
}

impl FromStr for ScoringTier {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(Self::Baseline),
            "enriched" => Ok(Self::Enriched),
            other => Err(format!("unknown scoring tier '{other}'")),
        }
    }
}

impl fmt::Display for ScoringTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Baseline => "baseline",
            Self::Enriched => "enriched",
        })
    }
}

/// Score, order, and truncate candidates.
///
/// # Examples
/// ```
/// use nearby::domain::{BaselineScorer, ScoringContext, rank};
///
/// let ranked = rank(Vec::new(), &BaselineScorer, &ScoringContext::default(), 4);
/// assert!(ranked.is_empty());
/// ```
#[must_use]
pub fn rank(
    candidates: Vec<Candidate>,
    scorer: &dyn PlaceScorer,
    context: &ScoringContext,
    top_n: usize,
) -> Vec<Place> {
    let mut places: Vec<Place> = candidates
        .into_iter()
        .map(|candidate| {
            let score = scorer.score(&candidate, context);
            Place {
                score,
                ..candidate.place
            }
        })
        .collect();

    // `sort_by` is stable: equal keys keep provider order.
    places.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| by_distance(a, b)));
    places.truncate(top_n);
    places
}

/// Unknown distances sort after known ones so the order stays total.
fn by_distance(a: &Place, b: &Place) -> Ordering {
    match (a.distance_metres, b.distance_metres) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
