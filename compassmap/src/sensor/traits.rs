//! Sensor seams.
//!
//! The controller never talks to platform APIs directly. It consumes these
//! traits, which a host implements over its geolocation, compass and
//! permission services. Futures are boxed so the traits stay dyn-compatible
//! and sources can be swapped at runtime.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::error::SensorError;
use super::permission::{Capability, PermissionStatus};
use super::sample::{HeadingSample, PositionSample};
use super::subscription::SensorSubscription;

/// Boxed future returned by sensor trait methods.
pub type SensorFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default minimum interval between position fixes.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Default minimum movement (meters) between position fixes.
pub const DEFAULT_DISTANCE_INTERVAL_M: f64 = 1.0;

/// Options for a position subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Request the most accurate fix the hardware can provide.
    pub high_accuracy: bool,
    /// Minimum time between fixes.
    pub interval: Duration,
    /// Minimum movement between fixes, in meters.
    pub distance_interval_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            interval: DEFAULT_WATCH_INTERVAL,
            distance_interval_m: DEFAULT_DISTANCE_INTERVAL_M,
        }
    }
}

/// Source of device position fixes.
pub trait PositionSource: Send + Sync {
    /// Take a single fix.
    fn current_position(
        &self,
        options: WatchOptions,
    ) -> SensorFuture<'_, Result<PositionSample, SensorError>>;

    /// Subscribe to a continuous stream of fixes.
    ///
    /// Returns once the subscription is registered; samples arrive
    /// asynchronously on the returned handle.
    fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<SensorSubscription<PositionSample>, SensorError>;
}

/// Source of compass headings.
pub trait HeadingSource: Send + Sync {
    /// Subscribe to heading updates.
    ///
    /// Devices without a compass return [`SensorError::StreamUnavailable`].
    fn watch_heading(&self) -> Result<SensorSubscription<HeadingSample>, SensorError>;
}

/// Grants or refuses access to a device capability.
pub trait PermissionGate: Send + Sync {
    fn request(&self, capability: Capability) -> SensorFuture<'_, PermissionStatus>;
}
