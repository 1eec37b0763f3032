//! Stdin view commands.
//!
//! ```text
//! reset                          Reset View: recenter with the default span
//! center                         Center View: recenter keeping the zoom
//! pan <lat> <lon> <dlat> <dlon>  move the viewport
//! quit                           stop the view
//! ```

use compassmap::controller::{ControllerError, ControllerHandle};
use compassmap::geo::Coordinate;
use compassmap::view::MapRegion;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

pub const HELP: &str = "Commands: reset | center | pan <lat> <lon> <dlat> <dlon> | quit";

/// A command typed by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserCommand {
    Reset,
    Center,
    Pan(MapRegion),
    Quit,
    Help,
}

impl UserCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_lowercase().as_str(), args.len()) {
            ("reset" | "r", 0) => UserCommand::Reset,
            ("center" | "c", 0) => UserCommand::Center,
            ("quit" | "q" | "exit", 0) => UserCommand::Quit,
            ("help" | "?", 0) => UserCommand::Help,
            ("pan", 4) => {
                let mut values = [0.0; 4];
                for (slot, raw) in values.iter_mut().zip(&args) {
                    *slot = raw
                        .parse()
                        .map_err(|_| format!("'{}' is not a number", raw))?;
                }
                let [lat, lon, dlat, dlon] = values;
                UserCommand::Pan(MapRegion::new(Coordinate::new(lat, lon), dlat, dlon))
            }
            ("pan", _) => return Err("usage: pan <lat> <lon> <dlat> <dlon>".to_string()),
            _ => return Err(format!("unknown command '{}'. {}", line.trim(), HELP)),
        };
        Ok(Some(command))
    }

    /// Forward the command to the controller.
    pub fn apply(self, handle: &ControllerHandle) -> Result<(), ControllerError> {
        match self {
            UserCommand::Reset => handle.recenter(),
            UserCommand::Center => handle.center_on_current_region(),
            UserCommand::Pan(region) => handle.viewport_changed(region),
            UserCommand::Quit => {
                handle.stop();
                Ok(())
            }
            // Keeps stdout free for frames
            UserCommand::Help => {
                eprintln!("{}", HELP);
                Ok(())
            }
        }
    }
}

/// Read commands from stdin until EOF or the controller stops.
pub async fn read_commands(handle: ControllerHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = handle.stopped() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Stdin closed, no more view commands");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
        };

        match UserCommand::parse(&line) {
            Ok(Some(command)) => match command.apply(&handle) {
                Ok(()) => {}
                Err(ControllerError::NotRunning) => break,
                Err(e) => eprintln!("{}", e),
            },
            Ok(None) => {}
            Err(msg) => eprintln!("{}", msg),
        }
    }
}
