//! Coordinates, bounding boxes, and great-circle distance.
//!
//! Bounding boxes are plain degree deltas around a center point. Longitude
//! degrees are not corrected for latitude, so boxes narrow physically towards
//! the poles; searches accept that approximation.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in metres.
pub const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in `[-90, 90]`.
    pub lat: f64,
    /// Longitude in `[-180, 180]`.
    pub lon: f64,
}

/// Reasons a coordinate pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// One of the components is NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NotFinite,
    /// Latitude outside `[-90, 90]`.
    #[error("latitude must be within [-90, 90]")]
    LatitudeOutOfRange,
    /// Longitude outside `[-180, 180]`.
    #[error("longitude must be within [-180, 180]")]
    LongitudeOutOfRange,
}

impl Coordinate {
    /// Validate and build a coordinate.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::Coordinate;
    ///
    /// assert!(Coordinate::new(19.4326, -99.1332).is_ok());
    /// assert!(Coordinate::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange);
        }
        Ok(Self { lat, lon })
    }

    /// Round both components to `decimals` places.
    #[must_use]
    pub fn rounded(self, decimals: u32) -> Self {
        let factor = 10_f64.powi(i32::try_from(decimals.min(9)).unwrap_or(9));
        Self {
            lat: (self.lat * factor).round() / factor,
            lon: (self.lon * factor).round() / factor,
        }
    }

    /// Haversine great-circle distance to `other`, in metres.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::Coordinate;
    ///
    /// let a = Coordinate { lat: 0.0, lon: 0.0 };
    /// let b = Coordinate { lat: 0.0, lon: 1.0 };
    /// let metres = a.distance_metres(b);
    /// assert!((metres - 111_195.0).abs() < 1.0);
    /// ```
    #[must_use]
    pub fn distance_metres(self, other: Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METRES * h.sqrt().clamp(0.0, 1.0).asin()
    }
}

/// Axis-aligned search region in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Expand `center` by `radius_deg` in every direction, clamped to WGS84.
    ///
    /// # Examples
    /// ```
    /// use nearby::domain::{BoundingBox, Coordinate};
    ///
    /// let bbox = BoundingBox::around(Coordinate { lat: 19.43, lon: -99.13 }, 0.02);
    /// assert!((bbox.min_lat - 19.41).abs() < 1e-9);
    /// assert!((bbox.max_lon + 99.11).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn around(center: Coordinate, radius_deg: f64) -> Self {
        let radius = radius_deg.abs();
        Self {
            min_lat: (center.lat - radius).max(-90.0),
            min_lon: (center.lon - radius).max(-180.0),
            max_lat: (center.lat + radius).min(90.0),
            max_lon: (center.lon + radius).min(180.0),
        }
    }

    /// Edges in `(south, west, north, east)` order.
    #[must_use]
    pub const fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_lat, self.min_lon, self.max_lat, self.max_lon)
    }
}
