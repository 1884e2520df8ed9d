//! # Traverse report
//!
//! Serialises the result of a traverse (the route and its metrics) to the
//! output file, as plain text or pretty-printed JSON.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fs, io, path::Path};

use serde::Serialize;
use thiserror::Error;

use crate::{metrics::RouteMetrics, route::Route};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The full result of a traverse.
#[derive(Debug, Clone, Serialize)]
pub struct TraverseReport {
    /// The planned route as raster (x, y) pixels
    pub route: Route,

    /// Summary statistics over the route
    pub metrics: RouteMetrics,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while writing traverse reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Cannot write the report file: {0}")]
    IoError(#[from] io::Error),

    #[error("Cannot serialise the report: {0}")]
    SerializeError(#[from] serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TraverseReport {
    /// Write the report as pretty-printed JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;

        Ok(())
    }

    /// Write the report as plain text: one `x,y` pixel per line, followed by
    /// a metrics summary block.
    pub fn write_text<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let mut file = fs::File::create(path)?;
        self.render_text(&mut file)?;

        Ok(())
    }

    fn render_text<W: io::Write>(&self, out: &mut W) -> Result<(), io::Error> {
        for point in self.route.points() {
            writeln!(out, "{},{}", point.x, point.y)?;
        }

        writeln!(out)?;
        writeln!(out, "# route_pixels: {}", self.route.len())?;
        writeln!(
            out,
            "# horizontal_distance_m: {:.3}",
            self.metrics.horizontal_distance_m
        )?;
        writeln!(
            out,
            "# total_distance_m: {:.3}",
            self.metrics.total_distance_m
        )?;
        writeln!(
            out,
            "# crow_flies_distance_m: {:.3}",
            self.metrics.crow_flies_distance_m
        )?;
        writeln!(
            out,
            "# total_elevation_change: {:.3}",
            self.metrics.total_elevation_change
        )?;
        writeln!(
            out,
            "# net_elevation_change: {:.3}",
            self.metrics.net_elevation_change
        )?;
        writeln!(out, "# max_slope_deg: {:.3}", self.metrics.max_slope_deg)?;
        writeln!(
            out,
            "# average_slope_deg: {:.3}",
            self.metrics.average_slope_deg
        )?;

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use nalgebra::Point2;

    use super::*;

    fn report() -> TraverseReport {
        let mut route = Route::from_start(Point2::new(0, 0), 3);
        route.append_leg(vec![Point2::new(1, 1), Point2::new(2, 2)]);

        TraverseReport {
            route,
            metrics: RouteMetrics {
                horizontal_distance_m: 2.0 * std::f64::consts::SQRT_2,
                total_distance_m: 2.0 * std::f64::consts::SQRT_2,
                crow_flies_distance_m: 2.0 * std::f64::consts::SQRT_2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_text_rendering() {
        let mut rendered = Vec::new();
        report().render_text(&mut rendered).unwrap();

        let text = String::from_utf8(rendered).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("0,0"));
        assert_eq!(lines.next(), Some("1,1"));
        assert_eq!(lines.next(), Some("2,2"));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("# route_pixels: 3"));

        assert!(text.contains("# total_distance_m: 2.828"));
        assert!(text.contains("# max_slope_deg: 0.000"));
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(report()).unwrap();

        assert_eq!(value["route"]["points"][0], serde_json::json!([0, 0]));
        assert!(value["metrics"]["total_distance_m"].is_number());
    }
}
