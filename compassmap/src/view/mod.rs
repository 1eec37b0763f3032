//! Map view state derivation.
//!
//! This module holds the pure, synchronous core of the map view: how sensor
//! samples and user commands change the view, how the displayed region is
//! derived from raw coordinates, and how the marker is posed.
//!
//! # Design Philosophy
//!
//! - **No I/O**: nothing here subscribes, spawns or blocks
//! - **Change reporting**: every mutation returns whether something visible
//!   changed, so the owner decides when to notify renderers
//! - **Single owner**: [`ViewState`] is mutated only by the controller's
//!   event loop
//!
//! # Example
//!
//! ```ignore
//! use compassmap::view::ViewState;
//!
//! let mut state = ViewState::default();
//! state.on_position_sample(PositionSample::new(Coordinate::new(40.0, -70.0)))?;
//! assert!(state.is_initialized());
//! let region = state.current_region();
//! ```

mod marker;
mod region;
mod state;

pub use marker::{MarkerGeometry, MarkerPose, ARROW_DISTANCE, ARROW_SIZE, DOT_SIZE, HALO_RADIUS};
pub use region::{InvalidRegion, MapRegion, Span, DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE_DELTA};
pub use state::{ViewDefaults, ViewState, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
