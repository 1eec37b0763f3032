//! Single-writer event loop owning the view state.
//!
//! Position samples, heading samples and user commands arrive on three
//! independent channels. The loop is their only consumer, so each event is
//! applied atomically with respect to the others and no lock guards the
//! state. Emission order between the streams is not assumed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::handle::ViewCommand;
use crate::sensor::{HeadingSample, PositionSample, SensorSubscription};
use crate::view::ViewState;

/// Wait for the next sample of an optional stream.
///
/// A missing or finished stream never resolves, so the `select!` in the loop
/// simply stops polling it.
async fn next_sample<T: Send>(subscription: &mut Option<SensorSubscription<T>>) -> Option<T> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

pub(super) struct EventLoop {
    pub(super) state: ViewState,
    pub(super) positions: Option<SensorSubscription<PositionSample>>,
    pub(super) headings: Option<SensorSubscription<HeadingSample>>,
    pub(super) commands: mpsc::Receiver<ViewCommand>,
    pub(super) active: Arc<AtomicBool>,
    pub(super) cancellation: CancellationToken,
    pub(super) publisher: Arc<watch::Sender<ViewState>>,
}

impl EventLoop {
    pub(super) async fn run(mut self) {
        info!(
            position = self.positions.is_some(),
            heading = self.headings.is_some(),
            "View controller event loop started"
        );

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation.cancelled() => break,

                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command);
                }

                sample = next_sample(&mut self.positions) => match sample {
                    Some(sample) => self.handle_position(sample),
                    None => {
                        debug!("Position stream ended");
                        self.positions = None;
                    }
                },

                sample = next_sample(&mut self.headings) => match sample {
                    Some(sample) => self.handle_heading(sample),
                    None => {
                        debug!("Heading stream ended");
                        self.headings = None;
                    }
                },
            }
        }

        self.teardown();
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn handle_position(&mut self, sample: PositionSample) {
        if !self.is_active() {
            trace!("Dropping position sample delivered after stop");
            return;
        }
        match self.state.on_position_sample(sample) {
            Ok(true) => {
                debug!(
                    lat = sample.coordinate.latitude,
                    lon = sample.coordinate.longitude,
                    initialized = self.state.is_initialized(),
                    "Position updated"
                );
                self.publish();
            }
            Ok(false) => trace!("Duplicate position sample ignored"),
            Err(e) => warn!(error = %e, "Discarding position sample"),
        }
    }

    fn handle_heading(&mut self, sample: HeadingSample) {
        if !self.is_active() {
            trace!("Dropping heading sample delivered after stop");
            return;
        }
        match self.state.on_heading_sample(sample) {
            Ok(true) => {
                trace!(heading = sample.true_heading, "Heading updated");
                self.publish();
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Discarding heading sample"),
        }
    }

    fn handle_command(&mut self, command: ViewCommand) {
        if !self.is_active() {
            trace!(?command, "Dropping command delivered after stop");
            return;
        }
        let changed = match command {
            ViewCommand::Recenter => {
                debug!("Resetting view");
                self.state.recenter()
            }
            ViewCommand::CenterOnCurrentRegion => {
                debug!("Centering view");
                self.state.center_on_current_region()
            }
            ViewCommand::ViewportChanged(region) => match self.state.on_viewport_changed(region) {
                Ok(changed) => changed,
                Err(e) => {
                    warn!(error = %e, "Ignoring viewport change");
                    false
                }
            },
            ViewCommand::ApplyFix(fix) => {
                // Publishes on its own
                self.handle_position(fix);
                false
            }
        };
        if changed {
            self.publish();
        }
    }

    /// Notify observers of the new state.
    fn publish(&self) {
        if !self.is_active() {
            return;
        }
        self.publisher.send_replace(self.state.clone());
    }

    fn teardown(&mut self) {
        if let Some(mut sub) = self.positions.take() {
            sub.unsubscribe();
        }
        if let Some(mut sub) = self.headings.take() {
            sub.unsubscribe();
        }
        self.commands.close();
        info!("View controller event loop stopped");
    }
}
