//! Sample types emitted by the device sensor streams.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::error::SensorError;
use crate::geo::Coordinate;

/// Milliseconds since the Unix epoch, saturating to zero before 1970.
fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A single position fix from the location sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    /// Reported position.
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters, if the sensor reports one.
    pub accuracy_m: Option<f64>,
    /// When the fix was taken (milliseconds since the Unix epoch).
    pub timestamp_ms: u64,
}

impl PositionSample {
    /// Create a sample stamped with the current wall-clock time.
    pub fn new(coordinate: Coordinate) -> Self {
        Self::with_timestamp(coordinate, now_epoch_ms())
    }

    /// Create a sample with an explicit timestamp.
    pub fn with_timestamp(coordinate: Coordinate, timestamp_ms: u64) -> Self {
        Self {
            coordinate,
            accuracy_m: None,
            timestamp_ms,
        }
    }

    /// Attach a horizontal accuracy radius.
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// Reject fixes with non-finite or out-of-range coordinates.
    pub fn validate(&self) -> Result<(), SensorError> {
        self.coordinate
            .validate()
            .map_err(|e| SensorError::MalformedSample(e.to_string()))
    }
}

/// A compass reading from the heading sensor.
///
/// Headings are in degrees clockwise from true north. Platforms report a
/// negative value when the heading cannot be determined; such samples are
/// valid but yield no marker rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadingSample {
    /// True heading in degrees, [0, 360), or negative when unknown.
    pub true_heading: f64,
}

impl HeadingSample {
    /// Sentinel used by sensors that cannot currently determine a heading.
    pub const UNKNOWN: HeadingSample = HeadingSample { true_heading: -1.0 };

    /// Create a heading sample.
    pub fn new(true_heading: f64) -> Self {
        Self { true_heading }
    }

    /// Whether the reading carries an actual heading.
    pub fn is_known(&self) -> bool {
        self.true_heading >= 0.0
    }

    /// Reject non-finite readings and headings of 360° or more.
    pub fn validate(&self) -> Result<(), SensorError> {
        if !self.true_heading.is_finite() {
            return Err(SensorError::MalformedSample(format!(
                "non-finite heading {}",
                self.true_heading
            )));
        }
        if self.true_heading >= 360.0 {
            return Err(SensorError::MalformedSample(format!(
                "heading {} out of range [0, 360)",
                self.true_heading
            )));
        }
        Ok(())
    }
}
