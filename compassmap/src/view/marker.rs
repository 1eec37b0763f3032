//! Location marker pose and glyph geometry.
//!
//! The marker is a dot with a white halo. When a heading is known, a
//! triangular pointer is drawn around the halo, rotated to the heading. The
//! geometry here is what a rendering surface needs to lay the glyph out; the
//! surface owns colors and drawing.

use serde::Serialize;

use crate::geo::Coordinate;

/// Diameter of the location dot.
pub const DOT_SIZE: f64 = 15.0;

/// Halo width around the dot.
pub const HALO_RADIUS: f64 = 6.0;

/// Height of the heading pointer.
pub const ARROW_SIZE: f64 = 7.0;

/// Gap between halo and pointer.
pub const ARROW_DISTANCE: f64 = 6.0;

/// Glyph dimensions, in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerGeometry {
    pub dot_size: f64,
    pub halo_radius: f64,
    pub arrow_size: f64,
    pub arrow_distance: f64,
    /// Anchor point within the glyph box, as fractions (0.5, 0.5 = centered).
    pub anchor: (f64, f64),
}

impl Default for MarkerGeometry {
    fn default() -> Self {
        Self {
            dot_size: DOT_SIZE,
            halo_radius: HALO_RADIUS,
            arrow_size: ARROW_SIZE,
            arrow_distance: ARROW_DISTANCE,
            anchor: (0.5, 0.5),
        }
    }
}

impl MarkerGeometry {
    /// Diameter of dot plus halo.
    pub fn halo_size(&self) -> f64 {
        self.dot_size + self.halo_radius
    }

    /// Side of the square box containing halo and pointer.
    pub fn heading_box_size(&self) -> f64 {
        self.halo_size() + self.arrow_size + self.arrow_distance
    }

    /// Margin centering an element of `size` inside the heading box.
    pub fn centering_margin(&self, size: f64) -> f64 {
        (self.heading_box_size() - size) / 2.0
    }

    /// Halo corner radius.
    pub fn halo_corner_radius(&self) -> f64 {
        (self.halo_size() / 2.0).ceil()
    }

    /// Half-width of the pointer triangle's base.
    pub fn arrow_half_base(&self) -> f64 {
        self.arrow_size * 0.75
    }
}

/// Where and how to draw the location marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerPose {
    /// Marker position.
    pub coordinate: Coordinate,
    /// Pointer rotation in degrees clockwise from north, `None` for a flat dot.
    pub rotation: Option<f64>,
    pub geometry: MarkerGeometry,
}

impl MarkerPose {
    /// Whether the heading pointer glyph should be drawn.
    pub fn has_pointer(&self) -> bool {
        self.rotation.is_some()
    }

    /// Rotation as a transform string, e.g. `"45deg"`.
    pub fn rotation_transform(&self) -> Option<String> {
        self.rotation.map(|deg| format!("{}deg", deg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_sizes() {
        let geometry = MarkerGeometry::default();
        assert_eq!(geometry.halo_size(), 21.0);
        assert_eq!(geometry.heading_box_size(), 34.0);
        assert_eq!(geometry.centering_margin(geometry.halo_size()), 6.5);
        assert_eq!(geometry.centering_margin(geometry.dot_size), 9.5);
        assert_eq!(geometry.halo_corner_radius(), 11.0);
        assert_eq!(geometry.arrow_half_base(), 5.25);
    }

    #[test]
    fn test_pose_pointer_follows_rotation() {
        let flat = MarkerPose {
            coordinate: Coordinate::new(0.0, 0.0),
            rotation: None,
            geometry: MarkerGeometry::default(),
        };
        assert!(!flat.has_pointer());
        assert_eq!(flat.rotation_transform(), None);

        let pointed = MarkerPose {
            rotation: Some(45.0),
            ..flat
        };
        assert!(pointed.has_pointer());
        assert_eq!(pointed.rotation_transform().as_deref(), Some("45deg"));
    }
}
