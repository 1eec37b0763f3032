//! Device sensor streams.
//!
//! The view controller consumes two independent asynchronous streams, GPS
//! position and compass heading, plus a permission gate consulted before the
//! first subscription. This module defines the sample types, the source
//! traits hosts implement, and the subscription handles connecting them.
//!
//! # Architecture
//!
//! ```text
//! PositionSource ──► SensorSubscription<PositionSample> ──┐
//!                                                         ├──► controller event loop
//! HeadingSource  ──► SensorSubscription<HeadingSample>  ──┘
//! ```
//!
//! Two ready-made source families are provided:
//!
//! - [`ManualPositionSource`] / [`ManualHeadingSource`]: host pushes samples
//!   (platform bridges, tests)
//! - [`SimulatedPositionSource`] / [`SimulatedHeadingSource`]: route replay and
//!   compass sweep for headless runs
//!
//! # Example
//!
//! ```ignore
//! use compassmap::sensor::{ManualPositionSource, PositionSource, WatchOptions};
//!
//! let source = ManualPositionSource::new();
//! let mut sub = source.watch_position(WatchOptions::default())?;
//! source.push(PositionSample::new(Coordinate::new(40.0, -70.0)));
//! let sample = sub.recv().await;
//! sub.unsubscribe();
//! ```

mod error;
mod manual;
mod permission;
mod sample;
mod simulated;
mod subscription;
mod traits;

pub use error::{SensorError, SensorKind};
pub use manual::{ManualHeadingSource, ManualPositionSource};
pub use permission::{Capability, PermissionStatus, StaticPermissionGate};
pub use sample::{HeadingSample, PositionSample};
pub use simulated::{SimulatedHeadingSource, SimulatedPositionSource};
pub use subscription::{
    subscription_channel, SensorFeed, SensorSubscription, DEFAULT_SUBSCRIPTION_CAPACITY,
};
pub use traits::{
    HeadingSource, PermissionGate, PositionSource, SensorFuture, WatchOptions,
    DEFAULT_DISTANCE_INTERVAL_M, DEFAULT_WATCH_INTERVAL,
};
