//! Common utilities shared across CLI commands.

use std::path::Path;

use compassmap::geo::Coordinate;

use crate::error::CliError;

/// Number of points in the built-in demo walk.
const DEMO_ROUTE_POINTS: usize = 12;

/// Degrees moved per demo step (roughly 55 m of latitude).
const DEMO_STEP_DEG: f64 = 0.0005;

/// Parse a route: one `lat,lon` per line, `#` starts a comment.
pub fn parse_route(text: &str) -> Result<Vec<Coordinate>, CliError> {
    let mut route = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let coordinate: Coordinate = line
            .parse()
            .map_err(|e| CliError::Route(format!("line {}: {}", index + 1, e)))?;
        route.push(coordinate);
    }

    if route.is_empty() {
        return Err(CliError::Route("route has no points".to_string()));
    }
    Ok(route)
}

/// Read and parse a route file.
pub fn load_route(path: &Path) -> Result<Vec<Coordinate>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Route(format!("{}: {}", path.display(), e)))?;
    parse_route(&text)
}

/// A short walk north-east from `start`.
pub fn demo_route(start: Coordinate) -> Vec<Coordinate> {
    (0..DEMO_ROUTE_POINTS)
        .map(|i| {
            let step = i as f64 * DEMO_STEP_DEG;
            start.offset(step, step / 2.0)
        })
        .collect()
}
