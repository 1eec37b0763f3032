//! Run command - drive the map view from simulated sensors.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use compassmap::config::ConfigFile;
use compassmap::controller::{ControllerConfig, ControllerHandle, LocationHeadingController};
use compassmap::geo::Coordinate;
use compassmap::logging::init_logging;
use compassmap::render::drive_surface;
use compassmap::sensor::{
    HeadingSource, SimulatedHeadingSource, SimulatedPositionSource, StaticPermissionGate,
};
use tracing::info;

use super::common::{demo_route, load_route};
use crate::error::CliError;
use crate::input::{read_commands, HELP};
use crate::surface::TextSurface;

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Route file to replay: one `lat,lon` per line
    #[arg(long)]
    pub route: Option<PathBuf>,

    /// Milliseconds between route points
    #[arg(long, default_value_t = 500)]
    pub step_ms: u64,

    /// Replay the route in a loop
    #[arg(long)]
    pub repeat: bool,

    /// Simulate the user denying location access
    #[arg(long)]
    pub deny_permission: bool,

    /// Simulate a device without a compass
    #[arg(long)]
    pub no_heading: bool,

    /// Print each frame as a JSON line
    #[arg(long)]
    pub json: bool,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration: Option<u64>,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let _logging = init_logging(&config.logging)?;

    let controller_config = ControllerConfig::from_config_file(&config);
    let route = match &args.route {
        Some(path) => load_route(path)?,
        None => demo_route(controller_config.defaults.seed),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to create runtime: {}", e)))?;

    let result = runtime.block_on(run_session(&args, controller_config, route));

    // The stdin reader may still be parked on a blocking read
    runtime.shutdown_background();
    result
}

async fn run_session(
    args: &RunArgs,
    config: ControllerConfig,
    route: Vec<Coordinate>,
) -> Result<(), CliError> {
    let geometry = config.marker;

    let positions = SimulatedPositionSource::new(route)
        .with_step(Duration::from_millis(args.step_ms))
        .repeating(args.repeat);
    let headings: Arc<dyn HeadingSource> = if args.no_heading {
        Arc::new(SimulatedHeadingSource::unavailable())
    } else {
        Arc::new(SimulatedHeadingSource::new())
    };
    let permissions = if args.deny_permission {
        StaticPermissionGate::denied()
    } else {
        StaticPermissionGate::granted()
    };

    write_banner(&mut io::stdout(), args.json)
        .map_err(|e| CliError::Runtime(format!("Failed to write to stdout: {}", e)))?;

    let mut controller = LocationHeadingController::new(
        config,
        Arc::new(positions),
        headings,
        Arc::new(permissions),
    );
    let handle = controller.start().await?;

    let signal_handle = handle.clone();
    ctrlc::set_handler(move || signal_handle.stop())
        .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;

    if let Some(secs) = args.duration {
        tokio::spawn(stop_after(handle.clone(), Duration::from_secs(secs)));
    }
    let input = tokio::spawn(read_commands(handle.clone()));

    let mut surface = TextSurface::new(args.json);
    drive_surface(
        handle.watch(),
        &mut surface,
        geometry,
        handle.cancellation_token(),
    )
    .await;

    controller.stop();
    input.abort();

    let state = controller.snapshot();
    info!(
        frames = surface.frames(),
        initialized = state.is_initialized(),
        "Map view closed"
    );
    if !args.json {
        println!();
        println!("Session Summary");
        println!("───────────────");
        println!("  Frames rendered: {}", surface.frames());
        println!("  Last position:   {}", state.last_position().coordinate);
    }
    Ok(())
}

/// Banner and usage hints. JSON output carries frames only.
fn write_banner(out: &mut impl Write, json: bool) -> io::Result<()> {
    if json {
        return Ok(());
    }
    writeln!(out, "CompassMap v{}", compassmap::VERSION)?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "{}", HELP)?;
    writeln!(out, "Press Ctrl+C to exit")?;
    writeln!(out)
}

async fn stop_after(handle: ControllerHandle, after: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(after) => {
            info!(seconds = after.as_secs(), "Run duration elapsed");
            handle.stop();
        }
        _ = handle.stopped() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RunArgs,
    }

    #[test]
    fn test_run_args_defaults() {
        let cli = TestCli::parse_from(["compassmap"]);
        assert_eq!(cli.args.step_ms, 500);
        assert!(cli.args.route.is_none());
        assert!(!cli.args.json);
        assert!(cli.args.duration.is_none());
    }

    #[test]
    fn test_run_args_flags() {
        let cli = TestCli::parse_from([
            "compassmap",
            "--route",
            "walk.route",
            "--deny-permission",
            "--no-heading",
            "--json",
            "--duration",
            "5",
        ]);
        assert_eq!(cli.args.route, Some(PathBuf::from("walk.route")));
        assert!(cli.args.deny_permission);
        assert!(cli.args.no_heading);
        assert!(cli.args.json);
        assert_eq!(cli.args.duration, Some(5));
    }

    #[test]
    fn test_banner_suppressed_in_json_mode() {
        let mut out = Vec::new();
        write_banner(&mut out, true).unwrap();
        assert!(out.is_empty());

        write_banner(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("CompassMap v"));
        assert!(text.contains(HELP));
    }

    #[tokio::test]
    async fn test_stop_after_stops_controller() {
        let mut controller = LocationHeadingController::new(
            ControllerConfig::default(),
            Arc::new(SimulatedPositionSource::new(vec![Coordinate::new(40.0, -70.0)])),
            Arc::new(SimulatedHeadingSource::new()),
            Arc::new(StaticPermissionGate::granted()),
        );
        let handle = controller.start().await.unwrap();

        stop_after(handle.clone(), Duration::from_millis(10)).await;

        assert!(!handle.is_active());
        assert!(!controller.is_running());
    }
}
