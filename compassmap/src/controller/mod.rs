//! Location/heading view controller.
//!
//! Subscribes to the device position and heading streams, reconciles their
//! samples into a [`ViewState`](crate::view::ViewState), and publishes every
//! change to the rendering layer.
//!
//! # Architecture
//!
//! ```text
//! position stream ──┐
//! heading stream  ──┼──► EventLoop (sole owner of ViewState) ──► watch::Sender
//! ControllerHandle ─┘        │                                       │
//!   (user commands)          └── active flag + CancellationToken     ▼
//!                                                             renderers/observers
//! ```
//!
//! The two sensor streams and the command queue are independent producers;
//! the event loop is their only consumer. `stop()` clears the active flag
//! before cancelling, so events that were already queued are dropped rather
//! than applied to a dead view.

mod config;
mod error;
mod event_loop;
mod handle;
mod location_heading;

pub use config::{ControllerConfig, DEFAULT_COMMAND_CAPACITY};
pub use error::ControllerError;
pub use handle::{ControllerHandle, ViewCommand};
pub use location_heading::LocationHeadingController;
