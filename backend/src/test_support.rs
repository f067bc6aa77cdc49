//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! with the `test-support` feature.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::bootstrap::build_search_stack_with;
use crate::domain::geo::Coordinate;
use crate::domain::ports::{
    ElementGeometry, PlaceQuery, PlaceSource, PlaceSourceError, ProviderElement,
};
use crate::domain::{PlaceSearchService, TagMap};
use crate::settings::NearbySettings;

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration: {error}; delta={delta:?}")
            }
        };
        *self.lock_clock() += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Place source replaying scripted responses and recording every query.
///
/// Once the script runs out every further call returns no elements.
#[derive(Default)]
pub struct ScriptedPlaceSource {
    scripted: Mutex<VecDeque<Result<Vec<ProviderElement>, PlaceSourceError>>>,
    queries: Mutex<Vec<PlaceQuery>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedPlaceSource {
    pub fn new(scripted: Vec<Result<Vec<ProviderElement>, PlaceSourceError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            ..Self::default()
        }
    }

    /// Sleep for `delay` before answering each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<PlaceQuery> {
        match self.queries.lock() {
            Ok(queries) => queries.clone(),
            Err(_) => panic!("queries mutex"),
        }
    }
}

#[async_trait]
impl PlaceSource for ScriptedPlaceSource {
    async fn fetch(&self, query: &PlaceQuery) -> Result<Vec<ProviderElement>, PlaceSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.queries.lock() {
            Ok(mut queries) => queries.push(query.clone()),
            Err(_) => panic!("queries mutex"),
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = match self.scripted.lock() {
            Ok(mut scripted) => scripted.pop_front(),
            Err(_) => panic!("script mutex"),
        };
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Build a node element at `lat`/`lon` with `tags`.
pub fn node(id: i64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> ProviderElement {
    ProviderElement {
        element_type: "node".to_owned(),
        id,
        geometry: Some(ElementGeometry::Point(Coordinate { lat, lon })),
        tags: tag_map(tags),
    }
}

/// Collect string pairs into a tag map.
pub fn tag_map(tags: &[(&str, &str)]) -> TagMap {
    tags.iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

/// Clock frozen at Monday 2024-06-03 09:30 UTC.
pub fn monday_morning() -> Arc<MutableClock> {
    match Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).single() {
        Some(now) => Arc::new(MutableClock::new(now)),
        None => panic!("fixed test instant is valid"),
    }
}

/// Search service over `source` with default settings, in-memory adapters,
/// and "now" taken from `clock` in UTC.
pub fn search_service(
    source: Arc<dyn PlaceSource>,
    clock: Arc<dyn Clock>,
) -> Arc<PlaceSearchService> {
    search_service_with(NearbySettings::default(), source, clock)
}

/// As [`search_service`] with explicit settings; the UTC offset defaults to
/// zero when unset.
pub fn search_service_with(
    mut settings: NearbySettings,
    source: Arc<dyn PlaceSource>,
    clock: Arc<dyn Clock>,
) -> Arc<PlaceSearchService> {
    settings.utc_offset_minutes.get_or_insert(0);
    match build_search_stack_with(&settings, source, clock) {
        Ok(stack) => stack.service,
        Err(error) => panic!("test search stack: {error}"),
    }
}
