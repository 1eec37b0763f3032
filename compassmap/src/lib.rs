//! CompassMap - live location and compass heading map view
//!
//! This library keeps a map view centered on the device's location and
//! rotates the location marker to the compass heading. It subscribes to a
//! position stream and a heading stream, reconciles each sample against the
//! current view, and publishes a region and a marker pose to a rendering
//! surface.
//!
//! # Modules
//!
//! - [`geo`]: coordinates and great-circle distance
//! - [`sensor`]: sample types, source traits, subscriptions, manual and
//!   simulated sources
//! - [`view`]: view state and the reconciliation rules
//! - [`controller`]: the location/heading controller and its handle
//! - [`render`]: frames and the rendering surface seam
//! - [`config`]: INI configuration file
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod controller;
pub mod geo;
pub mod logging;
pub mod render;
pub mod sensor;
pub mod view;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
