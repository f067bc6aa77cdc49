//! DTOs for decoding Overpass JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into
//! provider elements in one pass. Elements without a usable position keep
//! `geometry: None` and are dropped later by the domain mapper.

use serde::Deserialize;

use crate::domain::TagMap;
use crate::domain::geo::Coordinate;
use crate::domain::ports::{ElementGeometry, ProviderElement};

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
    /// Set by Overpass when the query failed server-side, e.g. on timeout.
    pub(super) remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: String,
    pub(super) id: i64,
    pub(super) lon: Option<f64>,
    pub(super) lat: Option<f64>,
    pub(super) center: Option<OverpassElementCenterDto>,
    #[serde(default)]
    pub(super) tags: TagMap,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementCenterDto {
    pub(super) lon: f64,
    pub(super) lat: f64,
}

impl OverpassResponseDto {
    pub(super) fn into_elements(self) -> Vec<ProviderElement> {
        self.elements
            .into_iter()
            .map(OverpassElementDto::into_element)
            .collect()
    }
}

impl OverpassElementDto {
    fn into_element(self) -> ProviderElement {
        let geometry = self.geometry();
        ProviderElement {
            element_type: self.element_type,
            id: self.id,
            geometry,
            tags: self.tags,
        }
    }

    fn geometry(&self) -> Option<ElementGeometry> {
        if let (Some(lon), Some(lat)) = (self.lon, self.lat) {
            return Coordinate::new(lat, lon).ok().map(ElementGeometry::Point);
        }
        self.center
            .as_ref()
            .and_then(|center| Coordinate::new(center.lat, center.lon).ok())
            .map(ElementGeometry::Centroid)
    }
}
