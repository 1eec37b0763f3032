//! Controller configuration.

use crate::config::ConfigFile;
use crate::geo::Coordinate;
use crate::sensor::WatchOptions;
use crate::view::{MarkerGeometry, Span, ViewDefaults};

/// Default capacity of the user command queue.
pub const DEFAULT_COMMAND_CAPACITY: usize = 32;

/// Settings for a [`LocationHeadingController`](super::LocationHeadingController).
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Seed position and recenter span.
    pub defaults: ViewDefaults,
    /// Options for the position subscription.
    pub watch: WatchOptions,
    /// Marker glyph geometry handed to renderers.
    pub marker: MarkerGeometry,
    /// Capacity of the user command queue.
    pub command_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            defaults: ViewDefaults::default(),
            watch: WatchOptions::default(),
            marker: MarkerGeometry::default(),
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Build controller settings from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let location = &config.location;
        let map = &config.map;
        Self {
            defaults: ViewDefaults {
                seed: Coordinate::new(map.default_latitude, map.default_longitude),
                span: Span::new(map.latitude_delta, map.longitude_delta),
            },
            watch: WatchOptions {
                high_accuracy: location.high_accuracy,
                interval: location.interval(),
                distance_interval_m: location.distance_interval_m,
            },
            ..Self::default()
        }
    }

    /// Set the seed position shown before the first fix.
    pub fn with_seed(mut self, seed: Coordinate) -> Self {
        self.defaults.seed = seed;
        self
    }

    /// Set the span applied on recenter.
    pub fn with_span(mut self, span: Span) -> Self {
        self.defaults.span = span;
        self
    }

    /// Set the position subscription options.
    pub fn with_watch_options(mut self, watch: WatchOptions) -> Self {
        self.watch = watch;
        self
    }

    /// Set the command queue capacity.
    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }
}
