//! Simulated sensors for headless runs.
//!
//! [`SimulatedPositionSource`] replays a route of coordinates, honoring the
//! subscription's interval and distance filter the way a real location
//! service would. [`SimulatedHeadingSource`] sweeps the compass at a fixed
//! rate. Both spawn onto the current tokio runtime and stop as soon as the
//! subscriber unsubscribes.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use super::error::{SensorError, SensorKind};
use super::sample::{HeadingSample, PositionSample};
use super::subscription::{subscription_channel, SensorSubscription, DEFAULT_SUBSCRIPTION_CAPACITY};
use super::traits::{HeadingSource, PositionSource, SensorFuture, WatchOptions};
use crate::geo::Coordinate;

/// Default time between simulated route points.
const DEFAULT_STEP: Duration = Duration::from_millis(500);

/// Default reported accuracy of simulated fixes (meters).
const DEFAULT_ACCURACY_M: f64 = 5.0;

/// Shortest tick the simulators will run at.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Default heading sweep per update (degrees).
const DEFAULT_HEADING_STEP_DEG: f64 = 15.0;

/// Default time between heading updates.
const DEFAULT_HEADING_INTERVAL: Duration = Duration::from_millis(250);

fn require_runtime(kind: SensorKind) -> Result<tokio::runtime::Handle, SensorError> {
    tokio::runtime::Handle::try_current()
        .map_err(|e| SensorError::unavailable(kind, format!("no async runtime: {}", e)))
}

/// Position source replaying a fixed route.
#[derive(Debug, Clone)]
pub struct SimulatedPositionSource {
    route: Vec<Coordinate>,
    step: Duration,
    accuracy_m: f64,
    repeat: bool,
}

impl SimulatedPositionSource {
    /// Create a source replaying `route` once.
    pub fn new(route: Vec<Coordinate>) -> Self {
        Self {
            route,
            step: DEFAULT_STEP,
            accuracy_m: DEFAULT_ACCURACY_M,
            repeat: false,
        }
    }

    /// Set the time between route points.
    ///
    /// The effective period is never shorter than the subscriber's
    /// requested interval.
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Set the accuracy radius reported with each fix.
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = accuracy_m;
        self
    }

    /// Loop back to the first point after the last one.
    pub fn repeating(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// The route being replayed.
    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }
}

impl PositionSource for SimulatedPositionSource {
    fn current_position(
        &self,
        _options: WatchOptions,
    ) -> SensorFuture<'_, Result<PositionSample, SensorError>> {
        let first = self.route.first().copied();
        let accuracy_m = self.accuracy_m;
        Box::pin(async move {
            first
                .map(|c| PositionSample::new(c).with_accuracy(accuracy_m))
                .ok_or_else(|| SensorError::unavailable(SensorKind::Position, "empty route"))
        })
    }

    fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<SensorSubscription<PositionSample>, SensorError> {
        if self.route.is_empty() {
            return Err(SensorError::unavailable(SensorKind::Position, "empty route"));
        }
        let runtime = require_runtime(SensorKind::Position)?;

        let (feed, subscription) = subscription_channel(DEFAULT_SUBSCRIPTION_CAPACITY);
        let route = self.route.clone();
        let accuracy_m = self.accuracy_m;
        let repeat = self.repeat;
        let period = self.step.max(options.interval).max(MIN_TICK);

        runtime.spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut index = 0usize;
            let mut last_emitted: Option<Coordinate> = None;

            loop {
                tokio::select! {
                    biased;
                    _ = feed.closed() => break,
                    _ = ticker.tick() => {}
                }

                if index >= route.len() {
                    if !repeat {
                        break;
                    }
                    index = 0;
                }
                let next = route[index];
                index += 1;

                // Distance filter: stationary or near-stationary points are not reported
                if let Some(prev) = last_emitted {
                    if prev.distance_m(&next) < options.distance_interval_m {
                        continue;
                    }
                }

                let sample = PositionSample::new(next).with_accuracy(accuracy_m);
                if !feed.emit(sample).await {
                    break;
                }
                last_emitted = Some(next);
            }

            tracing::debug!("Simulated position stream finished");
        });

        Ok(subscription)
    }
}

/// Heading source sweeping the compass.
#[derive(Debug, Clone)]
pub struct SimulatedHeadingSource {
    start_deg: f64,
    step_deg: f64,
    interval: Duration,
    available: bool,
}

impl Default for SimulatedHeadingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHeadingSource {
    pub fn new() -> Self {
        Self {
            start_deg: 0.0,
            step_deg: DEFAULT_HEADING_STEP_DEG,
            interval: DEFAULT_HEADING_INTERVAL,
            available: true,
        }
    }

    /// A device without a compass.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Set the initial heading and per-update sweep.
    pub fn with_sweep(mut self, start_deg: f64, step_deg: f64) -> Self {
        self.start_deg = start_deg;
        self.step_deg = step_deg;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Heading reported by the `n`th update.
    pub fn heading_at(&self, n: u64) -> f64 {
        (self.start_deg + self.step_deg * n as f64).rem_euclid(360.0)
    }
}

impl HeadingSource for SimulatedHeadingSource {
    fn watch_heading(&self) -> Result<SensorSubscription<HeadingSample>, SensorError> {
        if !self.available {
            return Err(SensorError::unavailable(
                SensorKind::Heading,
                "no compass on this device",
            ));
        }
        let runtime = require_runtime(SensorKind::Heading)?;

        let (feed, subscription) = subscription_channel(DEFAULT_SUBSCRIPTION_CAPACITY);
        let source = self.clone();

        runtime.spawn(async move {
            let mut ticker = time::interval(source.interval.max(MIN_TICK));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut n = 0u64;

            loop {
                tokio::select! {
                    biased;
                    _ = feed.closed() => break,
                    _ = ticker.tick() => {}
                }

                let sample = HeadingSample::new(source.heading_at(n));
                if !feed.emit(sample).await {
                    break;
                }
                n += 1;
            }

            tracing::debug!("Simulated heading stream finished");
        });

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_options() -> WatchOptions {
        WatchOptions {
            interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_route_is_replayed_in_order() {
        let route = vec![
            Coordinate::new(40.0, -70.0),
            Coordinate::new(40.001, -70.0),
            Coordinate::new(40.002, -70.0),
        ];
        let source = SimulatedPositionSource::new(route.clone()).with_step(Duration::from_millis(1));
        let mut sub = source.watch_position(fast_options()).unwrap();

        for expected in &route {
            let sample = sub.recv().await.unwrap();
            assert_eq!(sample.coordinate, *expected);
            assert_eq!(sample.accuracy_m, Some(DEFAULT_ACCURACY_M));
        }
        // Route replayed once, stream ends
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_distance_filter_skips_stationary_points() {
        let route = vec![
            Coordinate::new(40.0, -70.0),
            Coordinate::new(40.0, -70.0),
            Coordinate::new(40.0, -70.0),
            Coordinate::new(40.01, -70.0),
        ];
        let source = SimulatedPositionSource::new(route).with_step(Duration::from_millis(1));
        let mut sub = source.watch_position(fast_options()).unwrap();

        assert_eq!(sub.recv().await.unwrap().coordinate, Coordinate::new(40.0, -70.0));
        assert_eq!(sub.recv().await.unwrap().coordinate, Coordinate::new(40.01, -70.0));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_empty_route_is_unavailable() {
        let source = SimulatedPositionSource::new(Vec::new());
        assert!(source.watch_position(fast_options()).is_err());
        assert!(source.current_position(fast_options()).await.is_err());
    }

    #[tokio::test]
    async fn test_current_position_is_first_route_point() {
        let source = SimulatedPositionSource::new(vec![Coordinate::new(1.0, 2.0)]);
        let fix = source.current_position(fast_options()).await.unwrap();
        assert_eq!(fix.coordinate, Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn test_heading_sweep_wraps() {
        let source = SimulatedHeadingSource::new().with_sweep(350.0, 15.0);
        assert_eq!(source.heading_at(0), 350.0);
        assert_eq!(source.heading_at(1), 5.0);
    }

    #[tokio::test]
    async fn test_heading_stream_emits_sweep() {
        let source = SimulatedHeadingSource::new()
            .with_sweep(0.0, 45.0)
            .with_interval(Duration::from_millis(1));
        let mut sub = source.watch_heading().unwrap();

        assert_eq!(sub.recv().await, Some(HeadingSample::new(0.0)));
        assert_eq!(sub.recv().await, Some(HeadingSample::new(45.0)));
        sub.unsubscribe();
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn test_unavailable_heading() {
        let source = SimulatedHeadingSource::unavailable();
        assert!(matches!(
            source.watch_heading(),
            Err(SensorError::StreamUnavailable { .. })
        ));
    }
}
