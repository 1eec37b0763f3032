//! The location/heading view controller.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ControllerConfig;
use super::error::ControllerError;
use super::event_loop::EventLoop;
use super::handle::ControllerHandle;
use crate::sensor::{
    Capability, HeadingSample, HeadingSource, PermissionGate, PermissionStatus, PositionSample,
    PositionSource, SensorError, SensorKind, SensorSubscription,
};
use crate::view::{MapRegion, ViewState};

/// Resources owned while the controller runs.
struct Running {
    handle: ControllerHandle,
    subscriptions: Vec<CancellationToken>,
    task: JoinHandle<()>,
}

/// Subscribes to the position and heading streams and derives the map view.
///
/// The controller owns the sensor sources and the permission gate. Calling
/// [`start`](Self::start) builds a fresh [`ViewState`], subscribes both
/// streams and spawns the single-writer event loop; [`stop`](Self::stop)
/// unsubscribes and discards the state. Observers follow state changes
/// through [`subscribe`](Self::subscribe) or a [`ControllerHandle`].
///
/// # Example
///
/// ```ignore
/// let mut controller = LocationHeadingController::new(
///     ControllerConfig::default(),
///     Arc::new(positions),
///     Arc::new(headings),
///     Arc::new(StaticPermissionGate::granted()),
/// );
///
/// let handle = controller.start().await?;
/// handle.recenter()?;
/// let region = handle.current_region();
/// controller.stop();
/// ```
pub struct LocationHeadingController {
    config: ControllerConfig,
    positions: Arc<dyn PositionSource>,
    headings: Arc<dyn HeadingSource>,
    permissions: Arc<dyn PermissionGate>,
    publisher: Arc<watch::Sender<ViewState>>,
    permission: Option<PermissionStatus>,
    running: Option<Running>,
}

impl LocationHeadingController {
    /// Create a stopped controller.
    pub fn new(
        config: ControllerConfig,
        positions: Arc<dyn PositionSource>,
        headings: Arc<dyn HeadingSource>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        let (publisher, _) = watch::channel(ViewState::new(config.defaults));
        Self {
            config,
            positions,
            headings,
            permissions,
            publisher: Arc::new(publisher),
            permission: None,
            running: None,
        }
    }

    /// Start the controller.
    ///
    /// Returns once subscriptions are registered; the first fix arrives
    /// asynchronously. Calling `start` on a running controller returns the
    /// existing handle without subscribing again.
    ///
    /// Fails only when polled outside a tokio runtime. Sensor failures do
    /// not fail the start: a denied permission leaves the view on default
    /// coordinates with a diagnostic, and a missing compass permanently
    /// disables marker rotation.
    pub async fn start(&mut self) -> Result<ControllerHandle, ControllerError> {
        if let Some(running) = &self.running {
            if running.handle.is_active() {
                debug!("View controller already started");
                return Ok(running.handle.clone());
            }
        }
        // Stopped through a handle; release what is left before restarting
        self.stop();

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ControllerError::Runtime(e.to_string()))?;

        let mut state = ViewState::new(self.config.defaults);
        let mut subscriptions = Vec::new();

        let (positions, headings) = match self.request_fix().await {
            Ok(fix) => {
                if let Some(fix) = fix {
                    match state.on_position_sample(fix) {
                        Ok(_) => debug!(
                            lat = fix.coordinate.latitude,
                            lon = fix.coordinate.longitude,
                            "Initial fix acquired"
                        ),
                        Err(e) => warn!(error = %e, "Discarding initial fix"),
                    }
                }
                let positions = self.subscribe_positions(&mut state);
                let headings = self.subscribe_headings(&mut state);
                (positions, headings)
            }
            Err(e) => {
                warn!(error = %e, "Location unavailable, showing default coordinates");
                state.set_diagnostic(e.to_string());
                (None, None)
            }
        };

        if let Some(sub) = &positions {
            subscriptions.push(sub.cancellation_token());
        }
        if let Some(sub) = &headings {
            subscriptions.push(sub.cancellation_token());
        }

        let cancellation = CancellationToken::new();
        let active = Arc::new(AtomicBool::new(true));
        let (command_tx, command_rx) = mpsc::channel(self.config.command_capacity.max(1));

        self.publisher.send_replace(state.clone());
        let handle = ControllerHandle::new(
            command_tx,
            cancellation.clone(),
            Arc::clone(&active),
            self.publisher.subscribe(),
        );

        let event_loop = EventLoop {
            state,
            positions,
            headings,
            commands: command_rx,
            active,
            cancellation,
            publisher: Arc::clone(&self.publisher),
        };
        let task = runtime.spawn(event_loop.run());

        info!(
            interval_ms = self.config.watch.interval.as_millis() as u64,
            distance_interval_m = self.config.watch.distance_interval_m,
            high_accuracy = self.config.watch.high_accuracy,
            "View controller started"
        );

        self.running = Some(Running {
            handle: handle.clone(),
            subscriptions,
            task,
        });
        Ok(handle)
    }

    /// Stop the controller and unsubscribe both streams.
    ///
    /// A no-op when the controller is not running. Samples already queued
    /// are discarded.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.handle.stop();
        for token in running.subscriptions {
            token.cancel();
        }
        if running.task.is_finished() {
            debug!("View controller event loop already finished");
        }
    }

    /// Take a fresh one-shot fix and apply it to the running view.
    ///
    /// Used for "where am I now" requests between stream updates. The fix
    /// goes through the same duplicate rule as stream samples. Fails with
    /// `NotRunning` when the controller is stopped and with the sensor error
    /// when permission is denied or no fix is available.
    pub async fn acquire_location(&mut self) -> Result<(), ControllerError> {
        let handle = match &self.running {
            Some(running) if running.handle.is_active() => running.handle.clone(),
            _ => return Err(ControllerError::NotRunning),
        };
        match self.request_fix().await? {
            Some(fix) => handle.apply_fix(fix),
            None => Err(SensorError::unavailable(SensorKind::Position, "no fix available").into()),
        }
    }

    /// Check the location permission, then ask for a one-shot fix.
    ///
    /// The permission gate is consulted once per controller; later calls
    /// reuse the answer. A missing fix is not an error here: the position
    /// stream will deliver one.
    async fn request_fix(&mut self) -> Result<Option<PositionSample>, SensorError> {
        let status = match self.permission {
            Some(status) => status,
            None => {
                let status = self.permissions.request(Capability::Location).await;
                self.permission = Some(status);
                status
            }
        };
        if !status.is_granted() {
            return Err(SensorError::PermissionDenied(Capability::Location));
        }

        match self.positions.current_position(self.config.watch).await {
            Ok(fix) => Ok(Some(fix)),
            Err(e) => {
                debug!(error = %e, "No one-shot fix available");
                Ok(None)
            }
        }
    }

    fn subscribe_positions(
        &self,
        state: &mut ViewState,
    ) -> Option<SensorSubscription<PositionSample>> {
        match self.positions.watch_position(self.config.watch) {
            Ok(sub) => Some(sub),
            Err(e) => {
                warn!(error = %e, "Position stream unavailable");
                state.set_diagnostic(e.to_string());
                None
            }
        }
    }

    fn subscribe_headings(
        &self,
        state: &mut ViewState,
    ) -> Option<SensorSubscription<HeadingSample>> {
        match self.headings.watch_heading() {
            Ok(sub) => Some(sub),
            Err(e) => {
                info!(error = %e, "Heading unavailable, marker rotation disabled");
                state.mark_heading_unavailable();
                if state.diagnostic().is_none() {
                    state.set_diagnostic(e.to_string());
                }
                None
            }
        }
    }

    /// Whether the controller is running and applying events.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| running.handle.is_active())
    }

    /// Handle to the running controller, if any.
    pub fn handle(&self) -> Option<ControllerHandle> {
        self.running.as_ref().map(|running| running.handle.clone())
    }

    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.publisher.subscribe()
    }

    /// Copy of the latest published state.
    pub fn snapshot(&self) -> ViewState {
        self.publisher.borrow().clone()
    }

    /// The displayed region, `None` before the first fix.
    pub fn current_region(&self) -> Option<MapRegion> {
        self.publisher.borrow().current_region()
    }

    /// Marker rotation in degrees, `None` for a flat marker.
    pub fn marker_rotation(&self) -> Option<f64> {
        self.publisher.borrow().marker_rotation()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

impl Drop for LocationHeadingController {
    fn drop(&mut self) {
        self.stop();
    }
}
