//! Sensor error types.

use thiserror::Error;

use super::permission::Capability;

/// Which sensor stream an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// GPS / network location.
    Position,
    /// Magnetometer compass.
    Heading,
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorKind::Position => write!(f, "position"),
            SensorKind::Heading => write!(f, "heading"),
        }
    }
}

/// Errors raised by sensor sources or while applying their samples.
///
/// None of these are fatal to the controller: each one degrades the view
/// (default coordinates, flat marker, dropped sample) and is surfaced as
/// observable state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    /// The user refused access to the capability.
    #[error("Permission to access {0} was denied")]
    PermissionDenied(Capability),

    /// The sensor hardware or platform service is absent.
    #[error("{kind} stream unavailable: {reason}")]
    StreamUnavailable { kind: SensorKind, reason: String },

    /// A sample carried non-finite or out-of-range values.
    #[error("Malformed sample: {0}")]
    MalformedSample(String),
}

impl SensorError {
    /// Shorthand for [`SensorError::StreamUnavailable`].
    pub fn unavailable(kind: SensorKind, reason: impl Into<String>) -> Self {
        SensorError::StreamUnavailable {
            kind,
            reason: reason.into(),
        }
    }
}
