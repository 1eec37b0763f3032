//! View state and the sample reconciliation rules.
//!
//! [`ViewState`] is the complete on-screen state of the map view. It is owned
//! by exactly one writer (the controller's event loop); every mutation goes
//! through one of the methods below, which return whether anything visible
//! changed so the owner knows when to notify observers.

use serde::Serialize;

use super::marker::{MarkerGeometry, MarkerPose};
use super::region::{InvalidRegion, MapRegion, Span};
use crate::geo::Coordinate;
use crate::sensor::{HeadingSample, PositionSample, SensorError};

/// Latitude of the position shown before the first fix.
pub const DEFAULT_LATITUDE: f64 = 37.78825;

/// Longitude of the position shown before the first fix.
pub const DEFAULT_LONGITUDE: f64 = -122.4324;

/// Seed values a fresh view starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewDefaults {
    /// Position shown until the first fix arrives.
    pub seed: Coordinate,
    /// Span applied by every recenter.
    pub span: Span,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            seed: Coordinate::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
            span: Span::default(),
        }
    }
}

/// On-screen state of the map view.
///
/// # Invariants
///
/// - `region` is `None` until the first position fix is applied
/// - `initialized` becomes `true` exactly once, on the first accepted fix,
///   which also centers the region on it with the default span
/// - region spans change only through [`recenter`](Self::recenter) or a
///   user viewport change; position updates never touch them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    last_position: PositionSample,
    last_heading: Option<HeadingSample>,
    region: Option<MapRegion>,
    initialized: bool,
    heading_available: bool,
    diagnostic: Option<String>,
    #[serde(skip)]
    defaults: ViewDefaults,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewDefaults::default())
    }
}

impl ViewState {
    /// Fresh state seeded with the default position.
    pub fn new(defaults: ViewDefaults) -> Self {
        Self {
            last_position: PositionSample::with_timestamp(defaults.seed, 0),
            last_heading: None,
            region: None,
            initialized: false,
            heading_available: true,
            diagnostic: None,
            defaults,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stream events
    // ─────────────────────────────────────────────────────────────────────

    /// Apply a position fix.
    ///
    /// A fix whose coordinate equals the stored one is discarded, whatever
    /// its timestamp or accuracy. The first accepted fix initializes the
    /// view and centers the region on it.
    ///
    /// Returns `Ok(true)` if the state changed.
    pub fn on_position_sample(&mut self, sample: PositionSample) -> Result<bool, SensorError> {
        sample.validate()?;

        if sample.coordinate == self.last_position.coordinate {
            return Ok(false);
        }
        self.last_position = sample;

        if !self.initialized {
            self.initialized = true;
            self.recenter();
        }
        Ok(true)
    }

    /// Apply a heading reading. Readings are stored unconditionally.
    pub fn on_heading_sample(&mut self, sample: HeadingSample) -> Result<bool, SensorError> {
        sample.validate()?;
        self.last_heading = Some(sample);
        Ok(true)
    }

    /// The user panned or zoomed the map.
    pub fn on_viewport_changed(&mut self, region: MapRegion) -> Result<bool, InvalidRegion> {
        region.validate()?;
        let changed = self.region != Some(region);
        self.region = Some(region);
        Ok(changed)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Center operations
    // ─────────────────────────────────────────────────────────────────────

    /// Center on the last known position with the default span.
    pub fn recenter(&mut self) -> bool {
        let region = MapRegion::centered_on(self.last_position.coordinate, self.defaults.span);
        self.replace_region(region)
    }

    /// Center on the last known position, keeping the current zoom.
    ///
    /// Without a displayed region there is no zoom to keep, so the default
    /// span is used.
    pub fn center_on_current_region(&mut self) -> bool {
        let center = self.last_position.coordinate;
        let region = match self.region {
            Some(region) => region.with_center(center),
            None => MapRegion::centered_on(center, self.defaults.span),
        };
        self.replace_region(region)
    }

    fn replace_region(&mut self, region: MapRegion) -> bool {
        let changed = self.region != Some(region);
        self.region = Some(region);
        changed
    }

    // ─────────────────────────────────────────────────────────────────────
    // Degradation
    // ─────────────────────────────────────────────────────────────────────

    /// Permanently disable marker rotation (no compass on this device).
    pub fn mark_heading_unavailable(&mut self) -> bool {
        let changed = self.heading_available;
        self.heading_available = false;
        changed
    }

    /// Record a human-readable diagnostic for display.
    pub fn set_diagnostic(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        let changed = self.diagnostic.as_deref() != Some(message.as_str());
        self.diagnostic = Some(message);
        changed
    }

    // ─────────────────────────────────────────────────────────────────────
    // Derived data
    // ─────────────────────────────────────────────────────────────────────

    /// The displayed region, or `None` before the first fix.
    pub fn current_region(&self) -> Option<MapRegion> {
        self.region
    }

    /// Region to show when none has been established yet.
    pub fn fallback_region(&self) -> MapRegion {
        MapRegion::centered_on(self.defaults.seed, self.defaults.span)
    }

    /// The displayed region, falling back to the default one.
    pub fn display_region(&self) -> MapRegion {
        self.region.unwrap_or_else(|| self.fallback_region())
    }

    /// Marker rotation in degrees, or `None` for a flat marker.
    pub fn marker_rotation(&self) -> Option<f64> {
        if !self.heading_available {
            return None;
        }
        self.last_heading
            .filter(HeadingSample::is_known)
            .map(|h| h.true_heading)
    }

    /// Marker pose for the rendering surface.
    pub fn marker_pose(&self, geometry: MarkerGeometry) -> MarkerPose {
        MarkerPose {
            coordinate: self.last_position.coordinate,
            rotation: self.marker_rotation(),
            geometry,
        }
    }

    pub fn last_position(&self) -> &PositionSample {
        &self.last_position
    }

    pub fn last_heading(&self) -> Option<HeadingSample> {
        self.last_heading
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn heading_available(&self) -> bool {
        self.heading_available
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn defaults(&self) -> &ViewDefaults {
        &self.defaults
    }
}
