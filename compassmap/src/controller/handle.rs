//! Cloneable handle for issuing commands to a running controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::error::ControllerError;
use crate::sensor::PositionSample;
use crate::view::{MapRegion, ViewState};

/// A user command routed through the event loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    /// "Reset View": center on the last position with the default span.
    Recenter,
    /// "Center View": center on the last position, keeping the zoom.
    CenterOnCurrentRegion,
    /// The user panned or zoomed the map.
    ViewportChanged(MapRegion),
    /// A one-shot fix taken outside the position stream.
    ApplyFix(PositionSample),
}

/// Handle to a running controller.
///
/// Handles are cheap to clone and can be moved to any task: the rendering
/// layer uses one to read state and forward viewport changes, the input layer
/// uses one to issue "Reset View"/"Center View", and any of them may call
/// [`stop`](Self::stop), including from inside a state-change observer.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ViewCommand>,
    cancellation: CancellationToken,
    active: Arc<AtomicBool>,
    state: watch::Receiver<ViewState>,
}

impl ControllerHandle {
    pub(super) fn new(
        commands: mpsc::Sender<ViewCommand>,
        cancellation: CancellationToken,
        active: Arc<AtomicBool>,
        state: watch::Receiver<ViewState>,
    ) -> Self {
        Self {
            commands,
            cancellation,
            active,
            state,
        }
    }

    /// Center on the last position with the default span.
    pub fn recenter(&self) -> Result<(), ControllerError> {
        self.send(ViewCommand::Recenter)
    }

    /// Center on the last position, keeping the current span.
    pub fn center_on_current_region(&self) -> Result<(), ControllerError> {
        self.send(ViewCommand::CenterOnCurrentRegion)
    }

    /// Report a user pan/zoom. Regions with non-finite fields are rejected.
    pub fn viewport_changed(&self, region: MapRegion) -> Result<(), ControllerError> {
        region.validate()?;
        self.send(ViewCommand::ViewportChanged(region))
    }

    pub(super) fn apply_fix(&self, fix: PositionSample) -> Result<(), ControllerError> {
        self.send(ViewCommand::ApplyFix(fix))
    }

    fn send(&self, command: ViewCommand) -> Result<(), ControllerError> {
        if !self.is_active() {
            return Err(ControllerError::NotRunning);
        }
        self.commands.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ControllerError::Busy,
            mpsc::error::TrySendError::Closed(_) => ControllerError::NotRunning,
        })
    }

    /// Stop the controller.
    ///
    /// Takes effect immediately: events already queued are discarded. Safe
    /// to call repeatedly and from within observers.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            tracing::info!("View controller stop requested");
        }
        self.cancellation.cancel();
    }

    /// Whether the controller is still applying events.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Resolves once the controller has been stopped.
    pub async fn stopped(&self) {
        self.cancellation.cancelled().await
    }

    /// Token cancelled when the controller stops.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The displayed region, `None` before the first fix.
    pub fn current_region(&self) -> Option<MapRegion> {
        self.state.borrow().current_region()
    }

    /// Marker rotation in degrees, `None` for a flat marker.
    pub fn marker_rotation(&self) -> Option<f64> {
        self.state.borrow().marker_rotation()
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }
}
