//! Output place records and their mapping from raw provider elements.

use serde::{Serialize, Serializer};

use super::geo::Coordinate;
use super::ports::ProviderElement;
use super::tags::{TagBool, TagMap, first_non_blank, non_blank};

/// Address value emitted when no address tags are present.
pub const ADDRESS_UNAVAILABLE: &str = "unavailable";

/// Coarse price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    /// `fee=no`.
    Free,
    /// `$`.
    Budget,
    /// `$$`.
    Moderate,
    /// `$$$`.
    Expensive,
    /// `$$$$` or more.
    Luxury,
}

impl PriceTier {
    /// Derive a tier from `price_range`/`price:range`, else `fee=no`.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::{PriceTier, TagMap};
    ///
    /// let tags: TagMap = [("price_range".to_owned(), "$$".to_owned())].into();
    /// assert_eq!(PriceTier::from_tags(&tags), Some(PriceTier::Moderate));
    /// ```
    #[must_use]
    pub fn from_tags(tags: &TagMap) -> Option<Self> {
        if let Some(range) = first_non_blank(tags, &["price_range", "price:range"]) {
            let symbols = range.chars().filter(|c| *c == '$').count();
            let tier = match symbols {
                0 => None,
                1 => Some(Self::Budget),
                2 => Some(Self::Moderate),
                3 => Some(Self::Expensive),
                _ => Some(Self::Luxury),
            };
            if tier.is_some() {
                return tier;
            }
        }
        match TagBool::from_tag(tags, "fee") {
            TagBool::False => Some(Self::Free),
            TagBool::True | TagBool::Unknown => None,
        }
    }
}

/// Optional attributes derived from boolean-like tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceFlags {
    /// `wheelchair`.
    pub wheelchair: Option<bool>,
    /// `internet_access`.
    pub wifi: Option<bool>,
    /// `indoor`.
    pub indoor: Option<bool>,
    /// `outdoor_seating`.
    pub outdoor_seating: Option<bool>,
    /// `kids_area`.
    pub kid_friendly: Option<bool>,
    /// `dog`.
    pub pet_friendly: Option<bool>,
    /// Price level from `price_range` or `fee`.
    pub price_tier: Option<PriceTier>,
}

impl PlaceFlags {
    /// Read every flag from `tags`.
    #[must_use]
    pub fn from_tags(tags: &TagMap) -> Self {
        Self {
            wheelchair: TagBool::from_tag(tags, "wheelchair").as_option(),
            wifi: wifi_flag(tags),
            indoor: TagBool::from_tag(tags, "indoor").as_option(),
            outdoor_seating: TagBool::from_tag(tags, "outdoor_seating").as_option(),
            kid_friendly: TagBool::from_tag(tags, "kids_area").as_option(),
            pet_friendly: dog_flag(tags),
            price_tier: PriceTier::from_tags(tags),
        }
    }
}

/// `internet_access` also names the medium (`wlan`, `wired`, ...).
fn wifi_flag(tags: &TagMap) -> Option<bool> {
    let value = non_blank(tags, "internet_access")?;
    match value.to_ascii_lowercase().as_str() {
        "wlan" | "wifi" | "wired" | "terminal" => Some(true),
        _ => TagBool::parse(value).as_option(),
    }
}

/// `dog` uses `leashed` and `unleashed` alongside yes/no.
fn dog_flag(tags: &TagMap) -> Option<bool> {
    let value = non_blank(tags, "dog")?;
    match value.to_ascii_lowercase().as_str() {
        "leashed" | "unleashed" | "outside" => Some(true),
        _ => TagBool::parse(value).as_option(),
    }
}

/// A ranked point of interest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Provider reference such as `node/101`.
    pub id: String,
    /// Display name; never blank.
    pub name: String,
    /// Resolved category label.
    pub category: String,
    /// Latitude in WGS84.
    pub lat: f64,
    /// Longitude in WGS84.
    pub lon: f64,
    /// Best-effort address; serialised as `"unavailable"` when unknown.
    #[serde(serialize_with = "serialize_address")]
    pub address: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Declared `opening_hours` value, verbatim.
    pub opening_hours: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Relevance score assigned during ranking.
    pub score: u32,
    /// Great-circle distance from the query center.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_metres: Option<f64>,
    /// Derived boolean-like attributes.
    pub flags: PlaceFlags,
}

fn serialize_address<S>(address: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(address.as_deref().unwrap_or(ADDRESS_UNAVAILABLE))
}

/// A mapped place that still carries its raw tags for filtering and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Output record; `score` is zero until ranked.
    pub place: Place,
    /// Raw provider tags.
    pub tags: TagMap,
}

impl Candidate {
    /// Map a provider element, dropping it when it lacks a name or a
    /// position.
    #[must_use]
    pub fn from_element(
        element: ProviderElement,
        category: &str,
        center: Coordinate,
    ) -> Option<Self> {
        let coordinate = element.geometry?.coordinate();
        let name = first_non_blank(&element.tags, &["name", "official_name"])?;
        let name = name.to_owned();
        let tags = element.tags;

        let place = Place {
            id: format!("{}/{}", element.element_type, element.id),
            name,
            category: category.to_owned(),
            lat: coordinate.lat,
            lon: coordinate.lon,
            address: address(&tags),
            phone: owned(first_non_blank(&tags, &["phone", "contact:phone"])),
            opening_hours: owned(non_blank(&tags, "opening_hours")),
            website: owned(first_non_blank(
                &tags,
                &["website", "contact:website", "url"],
            )),
            description: owned(non_blank(&tags, "description")),
            score: 0,
            distance_metres: Some(center.distance_metres(coordinate)),
            flags: PlaceFlags::from_tags(&tags),
        };
        Some(Self { place, tags })
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_owned)
}

/// `addr:full`, else street/number/city composed, else absent.
fn address(tags: &TagMap) -> Option<String> {
    if let Some(full) = non_blank(tags, "addr:full") {
        return Some(full.to_owned());
    }
    let number = non_blank(tags, "addr:housenumber");
    let street = match (non_blank(tags, "addr:street"), number) {
        (Some(street), Some(number)) => Some(format!("{street} {number}")),
        (Some(street), None) => Some(street.to_owned()),
        (None, _) => None,
    };
    let parts: Vec<String> = street
        .into_iter()
        .chain(non_blank(tags, "addr:city").map(str::to_owned))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}
