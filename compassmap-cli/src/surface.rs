//! Terminal rendering surface.

use std::io::{self, Write};

use compassmap::render::{MapFrame, MapSurface};
use console::style;

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Nearest of the eight compass points for a heading in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    let sector = ((degrees.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    COMPASS_POINTS[sector]
}

/// One-line plain-text description of a frame.
pub fn format_frame(frame: &MapFrame) -> String {
    let region = &frame.region;
    let view = if frame.region_is_fallback {
        "default".to_string()
    } else {
        format!(
            "{} span {:.4} x {:.4}",
            region.center, region.latitude_delta, region.longitude_delta
        )
    };

    let heading = match frame.marker.rotation {
        Some(deg) => format!("{:5.1}° {}", deg, compass_point(deg)),
        None if frame.heading_available => "flat".to_string(),
        None => "no compass".to_string(),
    };

    format!(
        "view {} | marker {} | heading {}",
        view, frame.marker.coordinate, heading
    )
}

/// Prints frames as styled text or one JSON object per line.
///
/// In JSON mode nothing but frames is written, so the output can be piped
/// into a line-oriented JSON consumer.
pub struct TextSurface<W: Write = io::Stdout> {
    out: W,
    json: bool,
    frames: usize,
    last_diagnostic: Option<String>,
}

impl TextSurface {
    /// Surface writing to stdout.
    pub fn new(json: bool) -> Self {
        Self::with_writer(io::stdout(), json)
    }
}

impl<W: Write> TextSurface<W> {
    pub fn with_writer(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            frames: 0,
            last_diagnostic: None,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &MapFrame) -> io::Result<()> {
        if self.json {
            let line = serde_json::to_string(frame)?;
            return writeln!(self.out, "{}", line);
        }

        if frame.diagnostic != self.last_diagnostic {
            if let Some(message) = &frame.diagnostic {
                writeln!(
                    self.out,
                    "{} {}",
                    style("!").yellow().bold(),
                    style(message).yellow()
                )?;
            }
            self.last_diagnostic = frame.diagnostic.clone();
        }

        let line = format_frame(frame);
        if frame.region_is_fallback {
            writeln!(self.out, "{}", style(line).dim())
        } else {
            writeln!(self.out, "{}", line)
        }
    }
}

impl<W: Write> MapSurface for TextSurface<W> {
    fn render(&mut self, frame: &MapFrame) {
        self.frames += 1;
        if let Err(e) = self.write_frame(frame) {
            tracing::warn!(error = %e, "Failed to write frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compassmap::geo::Coordinate;
    use compassmap::sensor::{HeadingSample, PositionSample};
    use compassmap::view::{MarkerGeometry, ViewState};

    #[test]
    fn test_compass_point() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(44.0), "NE");
        assert_eq!(compass_point(180.0), "S");
        assert_eq!(compass_point(350.0), "N");
        assert_eq!(compass_point(292.5), "NW");
    }

    #[test]
    fn test_format_default_frame() {
        let frame = MapFrame::from_state(&ViewState::default(), MarkerGeometry::default());
        let line = format_frame(&frame);
        assert!(line.starts_with("view default"));
        assert!(line.contains("marker 37.788250, -122.432400"));
        assert!(line.ends_with("heading flat"));
    }

    #[test]
    fn test_format_frame_with_heading() {
        let mut state = ViewState::default();
        state
            .on_position_sample(PositionSample::new(Coordinate::new(40.0, -70.0)))
            .unwrap();
        state.on_heading_sample(HeadingSample::new(90.0)).unwrap();

        let line = format_frame(&MapFrame::from_state(&state, MarkerGeometry::default()));
        assert!(line.contains("view 40.000000, -70.000000 span 0.0922 x 0.0421"));
        assert!(line.contains(" 90.0° E"));
    }

    #[test]
    fn test_format_frame_without_compass() {
        let mut state = ViewState::default();
        state.mark_heading_unavailable();
        let line = format_frame(&MapFrame::from_state(&state, MarkerGeometry::default()));
        assert!(line.ends_with("heading no compass"));
    }

    #[test]
    fn test_json_mode_writes_only_json_lines() {
        let mut surface = TextSurface::with_writer(Vec::new(), true);

        let mut state = ViewState::default();
        state.set_diagnostic("Permission to access location was denied");
        surface.render(&MapFrame::from_state(&state, MarkerGeometry::default()));
        state
            .on_position_sample(PositionSample::new(Coordinate::new(40.0, -70.0)))
            .unwrap();
        surface.render(&MapFrame::from_state(&state, MarkerGeometry::default()));
        assert_eq!(surface.frames(), 2);

        let output = String::from_utf8(surface.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("region").is_some());
        }
    }

    #[test]
    fn test_text_mode_shows_diagnostic_once() {
        let mut surface = TextSurface::with_writer(Vec::new(), false);
        let mut state = ViewState::default();
        state.set_diagnostic("Permission to access location was denied");
        let frame = MapFrame::from_state(&state, MarkerGeometry::default());
        surface.render(&frame);
        surface.render(&frame);

        let output = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(output.matches("Permission to access location was denied").count(), 1);
        assert_eq!(output.lines().count(), 3);
    }
}
