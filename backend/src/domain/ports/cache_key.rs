//! Domain cache key type shared by search cache adapters.
use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::domain::geo::Coordinate;
use crate::domain::time_bucket::TimeBucket;

const KEY_NAMESPACE: &str = "places:v1:";

/// Cache key used to store and retrieve ranked search results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchCacheKey(String);

/// Everything that influences a search response.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKeyMaterial<'a> {
    /// Resolved category label.
    pub label: &'a str,
    /// Query center, already rounded to `precision` decimals.
    pub center: Coordinate,
    /// Decimal places used for the center.
    pub precision: u32,
    /// Requested time bucket.
    pub bucket: Option<TimeBucket>,
    /// Passthrough preferences echoed in the response.
    pub preferences: &'a BTreeMap<String, String>,
}

impl SearchCacheKey {
    /// Derive the namespaced digest key for a search.
    ///
    /// The canonical form lists fields in a fixed order and preferences
    /// sorted by name, so parameter arrival order never changes the key.
    /// Labels are used verbatim: raw OSM tag values are case-sensitive.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use nearby::domain::Coordinate;
    /// use nearby::domain::ports::{CacheKeyMaterial, SearchCacheKey};
    ///
    /// let preferences = BTreeMap::new();
    /// let key = SearchCacheKey::derive(&CacheKeyMaterial {
    ///     label: "park",
    ///     center: Coordinate { lat: 19.43, lon: -99.13 },
    ///     precision: 4,
    ///     bucket: None,
    ///     preferences: &preferences,
    /// });
    /// assert!(key.as_str().starts_with("places:v1:"));
    /// ```
    #[must_use]
    pub fn derive(material: &CacheKeyMaterial<'_>) -> Self {
        let canonical = canonical_form(material);
        let digest = Sha256::digest(canonical.as_bytes());
        Self(format!("{KEY_NAMESPACE}{}", hex::encode(digest)))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn canonical_form(material: &CacheKeyMaterial<'_>) -> String {
    let precision = material.precision as usize;
    let preferences = material
        .preferences
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "category={label}|lat={lat:.precision$}|lon={lon:.precision$}|bucket={bucket}|prefs={preferences}",
        label = material.label,
        lat = positive_zero(material.center.lat),
        lon = positive_zero(material.center.lon),
        bucket = material.bucket.map_or("-", TimeBucket::as_str),
    )
}

/// Map `-0.0` to `0.0` so both render identically.
fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl std::fmt::Display for SearchCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for SearchCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
