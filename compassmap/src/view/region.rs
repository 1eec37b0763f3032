//! Map regions: the viewport shown to the user.

use serde::Serialize;
use thiserror::Error;

use crate::geo::Coordinate;

/// Default latitude span of a centered region (degrees).
pub const DEFAULT_LATITUDE_DELTA: f64 = 0.0922;

/// Default longitude span of a centered region (degrees).
pub const DEFAULT_LONGITUDE_DELTA: f64 = 0.0421;

/// A region reported by the map surface had a non-finite field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid map region: {0}")]
pub struct InvalidRegion(pub String);

/// Latitude/longitude extent of a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Span {
    pub const fn new(latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE_DELTA)
    }
}

/// The visible map viewport: a center plus latitude/longitude spans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRegion {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub const fn new(center: Coordinate, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            center,
            latitude_delta,
            longitude_delta,
        }
    }

    /// Region centered on `center` with the given span.
    pub const fn centered_on(center: Coordinate, span: Span) -> Self {
        Self::new(center, span.latitude_delta, span.longitude_delta)
    }

    /// Same span, new center.
    pub fn with_center(&self, center: Coordinate) -> Self {
        Self { center, ..*self }
    }

    /// The region's span.
    pub fn span(&self) -> Span {
        Span::new(self.latitude_delta, self.longitude_delta)
    }

    /// Structural check: all four numeric fields must be finite.
    ///
    /// Viewports come from user pan/zoom gestures, so no range policy is
    /// applied beyond finiteness.
    pub fn validate(&self) -> Result<(), InvalidRegion> {
        let fields = [
            ("latitude", self.center.latitude),
            ("longitude", self.center.longitude),
            ("latitude_delta", self.latitude_delta),
            ("longitude_delta", self.longitude_delta),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(InvalidRegion(format!("{} is {}", name, value)));
            }
        }
        Ok(())
    }

    /// Whether `coord` falls inside the visible area.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        let half_lat = self.latitude_delta.abs() / 2.0;
        let half_lon = self.longitude_delta.abs() / 2.0;
        (coord.latitude - self.center.latitude).abs() <= half_lat
            && (coord.longitude - self.center.longitude).abs() <= half_lon
    }
}
