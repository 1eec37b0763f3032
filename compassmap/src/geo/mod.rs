//! Geographic coordinate primitives.
//!
//! Provides the immutable [`Coordinate`] value type shared by the sensor
//! streams, the view state and the rendering surface, together with range
//! validation and great-circle distance.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Errors produced when building or parsing coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude is non-finite or outside [-90, 90].
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude is non-finite or outside [-180, 180].
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Text could not be parsed as `lat,lon`.
    #[error("Invalid coordinate '{0}': expected 'lat,lon'")]
    Parse(String),
}

/// A geographic position in decimal degrees (WGS84).
///
/// Equality is structural: two coordinates are equal only when both
/// components compare equal as `f64`. The controller relies on this to
/// discard duplicate position fixes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without validation.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting non-finite or out-of-range components.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let coord = Self::new(latitude, longitude);
        coord.validate()?;
        Ok(coord)
    }

    /// Check that both components are finite and within range.
    pub fn validate(&self) -> Result<(), GeoError> {
        if !self.latitude.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&self.latitude) {
            return Err(GeoError::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(GeoError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }

    /// Great-circle distance to another coordinate in meters (haversine).
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Return a coordinate shifted by the given degree offsets.
    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self::new(self.latitude + dlat, self.longitude + dlon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = GeoError;

    /// Parse `lat,lon` (whitespace around either component is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| GeoError::Parse(s.to_string()))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::Parse(s.to_string()))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| GeoError::Parse(s.to_string()))?;
        Self::validated(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_accepts_range_limits() {
        assert!(Coordinate::validated(90.0, 180.0).is_ok());
        assert!(Coordinate::validated(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_validated_rejects_out_of_range() {
        assert_eq!(
            Coordinate::validated(90.5, 0.0),
            Err(GeoError::InvalidLatitude(90.5))
        );
        assert_eq!(
            Coordinate::validated(0.0, -181.0),
            Err(GeoError::InvalidLongitude(-181.0))
        );
    }

    #[test]
    fn test_validated_rejects_non_finite() {
        assert!(matches!(
            Coordinate::validated(f64::NAN, 0.0),
            Err(GeoError::InvalidLatitude(_))
        ));
        assert!(matches!(
            Coordinate::validated(0.0, f64::INFINITY),
            Err(GeoError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_structural_equality() {
        let a = Coordinate::new(37.78825, -122.4324);
        let b = Coordinate::new(37.78825, -122.4324);
        let c = Coordinate::new(37.78826, -122.4324);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let d = a.distance_m(&b);
        // One degree of latitude is ~111.2 km
        assert!((d - 111_195.0).abs() < 100.0, "got {} m", d);
    }

    #[test]
    fn test_distance_is_zero_for_same_point() {
        let a = Coordinate::new(53.5, 10.0);
        assert_eq!(a.distance_m(&a), 0.0);
    }

    #[test]
    fn test_parse_coordinate() {
        let coord: Coordinate = "40.0, -70.0".parse().unwrap();
        assert_eq!(coord, Coordinate::new(40.0, -70.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "40.0".parse::<Coordinate>(),
            Err(GeoError::Parse(_))
        ));
        assert!(matches!(
            "north,west".parse::<Coordinate>(),
            Err(GeoError::Parse(_))
        ));
        assert!(matches!(
            "95.0,10.0".parse::<Coordinate>(),
            Err(GeoError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_display() {
        let coord = Coordinate::new(40.0, -70.0);
        assert_eq!(coord.to_string(), "40.000000, -70.000000");
    }
}
