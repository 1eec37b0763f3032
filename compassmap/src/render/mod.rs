//! Rendering seam.
//!
//! The map itself is drawn by the host. This module turns each published
//! [`ViewState`] into a [`MapFrame`] (region, marker pose, diagnostic) and
//! hands it to a [`MapSurface`]. User pan/zoom flows the other way, through
//! [`ControllerHandle::viewport_changed`](crate::controller::ControllerHandle::viewport_changed).
//!
//! ```text
//! event loop ──watch──► drive_surface ──MapFrame──► MapSurface
//!     ▲                                                │
//!     └──────────── viewport_changed ◄─────────────────┘
//! ```

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::view::{MapRegion, MarkerGeometry, MarkerPose, ViewState};

/// Everything a surface needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    /// Region to display.
    pub region: MapRegion,
    /// True when no region has been established and the default is shown.
    pub region_is_fallback: bool,
    pub marker: MarkerPose,
    /// Message for the diagnostic overlay.
    pub diagnostic: Option<String>,
    pub initialized: bool,
    pub heading_available: bool,
}

impl MapFrame {
    /// Build the frame for a view state.
    pub fn from_state(state: &ViewState, geometry: MarkerGeometry) -> Self {
        let region = state.current_region();
        Self {
            region: region.unwrap_or_else(|| state.fallback_region()),
            region_is_fallback: region.is_none(),
            marker: state.marker_pose(geometry),
            diagnostic: state.diagnostic().map(str::to_string),
            initialized: state.is_initialized(),
            heading_available: state.heading_available(),
        }
    }
}

/// A sink that draws frames.
pub trait MapSurface {
    fn render(&mut self, frame: &MapFrame);
}

/// Surface that keeps every frame it was given.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    frames: Vec<MapFrame>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[MapFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&MapFrame> {
        self.frames.last()
    }
}

impl MapSurface for RecordingSurface {
    fn render(&mut self, frame: &MapFrame) {
        self.frames.push(frame.clone());
    }
}

/// Render the current state, then one frame per state change.
///
/// Runs until `cancellation` fires or the state publisher is dropped.
/// Changes published faster than the surface draws are coalesced; only the
/// latest state is rendered. Returns the number of frames rendered.
pub async fn drive_surface<S>(
    mut state: watch::Receiver<ViewState>,
    surface: &mut S,
    geometry: MarkerGeometry,
    cancellation: CancellationToken,
) -> usize
where
    S: MapSurface + ?Sized,
{
    let mut frames = 0;
    let frame = MapFrame::from_state(&state.borrow_and_update(), geometry);
    surface.render(&frame);
    frames += 1;

    loop {
        tokio::select! {
            biased;

            _ = cancellation.cancelled() => break,

            changed = state.changed() => {
                if changed.is_err() {
                    debug!("State publisher closed, render driver exiting");
                    break;
                }
                let frame = MapFrame::from_state(&state.borrow_and_update(), geometry);
                surface.render(&frame);
                frames += 1;
            }
        }
    }

    debug!(frames, "Render driver stopped");
    frames
}
