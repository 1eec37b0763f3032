//! Controller error types.

use thiserror::Error;

use crate::sensor::SensorError;
use crate::view::InvalidRegion;

/// Errors returned to callers of the controller API.
///
/// Sensor failures inside a running controller never surface here; they
/// degrade the view and are reported through
/// [`ViewState::diagnostic`](crate::view::ViewState::diagnostic). Only an
/// explicit location request returns one.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller was never started or has been stopped.
    #[error("Controller is not running")]
    NotRunning,

    /// The command queue is full; the event loop is behind.
    #[error("Controller command queue is full")]
    Busy,

    /// A viewport reported by the map surface was rejected.
    #[error(transparent)]
    InvalidRegion(#[from] InvalidRegion),

    /// A location request failed.
    #[error(transparent)]
    Sensor(#[from] SensorError),

    /// `start` was polled outside a tokio runtime.
    #[error("No tokio runtime available: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ControllerError::NotRunning.to_string(),
            "Controller is not running"
        );
        let err: ControllerError = InvalidRegion("latitude_delta is NaN".into()).into();
        assert_eq!(err.to_string(), "Invalid map region: latitude_delta is NaN");
    }
}
