//! Integration tests for the location/heading controller.
//!
//! These tests drive the controller end to end through host-fed sensors:
//! - Position fix → auto-centering → published state
//! - Heading samples → marker rotation
//! - User commands and viewport changes through the handle
//! - Stop semantics, including stop from inside an observer
//!
//! Run with: `cargo test --test controller_integration`

use std::sync::Arc;
use std::time::Duration;

use compassmap::controller::{ControllerConfig, ControllerError, LocationHeadingController};
use compassmap::geo::Coordinate;
use compassmap::render::{drive_surface, RecordingSurface};
use compassmap::sensor::{
    HeadingSample, ManualHeadingSource, ManualPositionSource, PositionSample,
    SimulatedHeadingSource, SimulatedPositionSource, StaticPermissionGate, WatchOptions,
};
use compassmap::view::MapRegion;

// ============================================================================
// Helper Functions
// ============================================================================

struct Rig {
    positions: Arc<ManualPositionSource>,
    headings: Arc<ManualHeadingSource>,
    controller: LocationHeadingController,
}

fn rig() -> Rig {
    let positions = Arc::new(ManualPositionSource::new());
    let headings = Arc::new(ManualHeadingSource::new());
    let controller = LocationHeadingController::new(
        ControllerConfig::default(),
        positions.clone(),
        headings.clone(),
        Arc::new(StaticPermissionGate::granted()),
    );
    Rig {
        positions,
        headings,
        controller,
    }
}

fn fix(lat: f64, lon: f64) -> PositionSample {
    PositionSample::new(Coordinate::new(lat, lon))
}

/// Give the event loop time to drain its queues.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Default seed, then a fix at {40, -70}: the view initializes and centers
/// with the default span.
#[tokio::test]
async fn test_first_fix_initializes_and_centers() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();

    let before = handle.snapshot();
    assert_eq!(
        before.last_position().coordinate,
        Coordinate::new(37.78825, -122.4324)
    );
    assert!(!before.is_initialized());

    rig.positions.push(fix(40.0, -70.0));
    settle().await;

    let state = handle.snapshot();
    assert!(state.is_initialized());
    assert_eq!(
        state.current_region(),
        Some(MapRegion::new(Coordinate::new(40.0, -70.0), 0.0922, 0.0421))
    );
}

/// Delivering the same coordinate again produces no state-change signal.
#[tokio::test]
async fn test_duplicate_fix_does_not_notify() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();
    let mut rx = handle.watch();

    rig.positions.push(fix(40.0, -70.0));
    settle().await;
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    rig.positions
        .push(PositionSample::with_timestamp(Coordinate::new(40.0, -70.0), 99).with_accuracy(3.0));
    settle().await;

    assert!(!rx.has_changed().unwrap());
}

/// Later fixes move the marker but never the user's viewport.
#[tokio::test]
async fn test_viewport_survives_position_updates() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();

    rig.positions.push(fix(40.0, -70.0));
    settle().await;

    let panned = MapRegion::new(Coordinate::new(41.0, -71.0), 0.5, 0.5);
    handle.viewport_changed(panned).unwrap();
    settle().await;

    rig.positions.push(fix(40.001, -70.001));
    settle().await;

    let state = handle.snapshot();
    assert_eq!(state.current_region(), Some(panned));
    assert_eq!(
        state.last_position().coordinate,
        Coordinate::new(40.001, -70.001)
    );
}

/// "Center View" keeps the zoom; "Reset View" restores the default span.
#[tokio::test]
async fn test_center_and_reset_commands() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();

    rig.positions.push(fix(40.0, -70.0));
    settle().await;
    handle
        .viewport_changed(MapRegion::new(Coordinate::new(45.0, -75.0), 2.0, 3.0))
        .unwrap();
    rig.positions.push(fix(40.5, -70.5));
    settle().await;

    handle.center_on_current_region().unwrap();
    settle().await;
    assert_eq!(
        handle.current_region(),
        Some(MapRegion::new(Coordinate::new(40.5, -70.5), 2.0, 3.0))
    );

    handle.recenter().unwrap();
    settle().await;
    assert_eq!(
        handle.current_region(),
        Some(MapRegion::new(Coordinate::new(40.5, -70.5), 0.0922, 0.0421))
    );
}

/// Heading 45 rotates the marker; the unknown sentinel flattens it.
#[tokio::test]
async fn test_heading_rotation() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();
    assert_eq!(handle.marker_rotation(), None);

    rig.headings.push(HeadingSample::new(45.0));
    settle().await;
    assert_eq!(handle.marker_rotation(), Some(45.0));

    rig.headings.push(HeadingSample::new(-1.0));
    settle().await;
    assert_eq!(handle.marker_rotation(), None);

    // Malformed headings are discarded
    rig.headings.push(HeadingSample::new(90.0));
    rig.headings.push(HeadingSample::new(400.0));
    settle().await;
    assert_eq!(handle.marker_rotation(), Some(90.0));
}

/// After stop, queued and later samples do not touch the state.
#[tokio::test]
async fn test_no_mutation_after_stop() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();

    rig.positions.push(fix(40.0, -70.0));
    settle().await;
    let before = handle.snapshot();

    rig.positions.push(fix(50.0, 10.0));
    rig.headings.push(HeadingSample::new(120.0));
    rig.controller.stop();
    settle().await;

    assert_eq!(handle.snapshot(), before);
    assert!(!handle.is_active());
    assert_eq!(rig.positions.live_subscribers(), 0);
    assert_eq!(rig.headings.live_subscribers(), 0);
}

/// An observer may stop the controller from its change callback.
#[tokio::test]
async fn test_stop_from_observer() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();

    let observer = {
        let handle = handle.clone();
        let mut rx = handle.watch();
        rx.borrow_and_update();
        tokio::spawn(async move {
            rx.changed().await.unwrap();
            let seen = rx.borrow_and_update().last_position().coordinate;
            handle.stop();
            seen
        })
    };

    rig.positions.push(fix(40.0, -70.0));
    let seen = observer.await.unwrap();
    assert_eq!(seen, Coordinate::new(40.0, -70.0));

    rig.positions.push(fix(41.0, -71.0));
    settle().await;

    assert!(!handle.is_active());
    assert_eq!(
        handle.snapshot().last_position().coordinate,
        Coordinate::new(40.0, -70.0)
    );
    assert!(matches!(handle.recenter(), Err(ControllerError::NotRunning)));
    assert!(matches!(
        handle.center_on_current_region(),
        Err(ControllerError::NotRunning)
    ));
}

/// Invalid viewports are rejected at the handle.
#[tokio::test]
async fn test_invalid_viewport_rejected() {
    let mut rig = rig();
    let handle = rig.controller.start().await.unwrap();

    let bad = MapRegion::new(Coordinate::new(f64::NAN, 0.0), 1.0, 1.0);
    assert!(matches!(
        handle.viewport_changed(bad),
        Err(ControllerError::InvalidRegion(_))
    ));
}

/// Simulated sensors drive the controller and a recording surface.
#[tokio::test]
async fn test_simulated_sensors_render_frames() {
    let route = vec![
        Coordinate::new(40.0, -70.0),
        Coordinate::new(40.001, -70.0),
        Coordinate::new(40.002, -70.0),
    ];
    let positions =
        Arc::new(SimulatedPositionSource::new(route.clone()).with_step(Duration::from_millis(5)));
    let headings = Arc::new(
        SimulatedHeadingSource::new()
            .with_sweep(0.0, 30.0)
            .with_interval(Duration::from_millis(5)),
    );
    let config = ControllerConfig::default().with_watch_options(WatchOptions {
        interval: Duration::from_millis(5),
        ..WatchOptions::default()
    });
    let geometry = config.marker;

    let mut controller = LocationHeadingController::new(
        config,
        positions,
        headings,
        Arc::new(StaticPermissionGate::granted()),
    );
    let handle = controller.start().await.unwrap();

    let rx = handle.watch();
    let cancellation = handle.cancellation_token();
    let driver = tokio::spawn(async move {
        let mut surface = RecordingSurface::new();
        drive_surface(rx, &mut surface, geometry, cancellation).await;
        surface
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    controller.stop();
    let surface = driver.await.unwrap();

    assert!(surface.frames().len() >= 2);
    let last = surface.last().unwrap();
    assert!(last.initialized);
    assert_eq!(last.region.center, route[0]);
    assert_eq!(last.marker.coordinate, route[2]);
    assert!(last.marker.rotation.is_some());
}
