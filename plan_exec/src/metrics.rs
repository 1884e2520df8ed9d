//! # Route metrics
//!
//! Summary statistics over a planned route. Metrics are post-processing, the
//! planner never reads them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::Serialize;

use crate::{dem::TerrainSource, route::Route};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Horizontal steps below this threshold (in pixel units) are skipped when
/// averaging slopes, avoiding division by near-zero
const MIN_SLOPE_STEP_PX: f64 = 1e-3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Summary statistics over a planned route.
///
/// Distances are in metres, elevation changes in the raster's (normalised)
/// elevation unit, slopes in degrees. Segments whose elevations cannot be
/// read contribute their horizontal distance only and are excluded from the
/// slope statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteMetrics {
    /// Sum of per-segment horizontal distances
    pub horizontal_distance_m: f64,

    /// Sum of per-segment 3D distances
    pub total_distance_m: f64,

    /// Straight-line distance between the route endpoints
    pub crow_flies_distance_m: f64,

    /// Sum of absolute per-segment elevation changes
    pub total_elevation_change: f64,

    /// Elevation difference between the route end and start
    pub net_elevation_change: f64,

    /// Steepest per-segment slope
    pub max_slope_deg: f64,

    /// Mean per-segment slope
    pub average_slope_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RouteMetrics {
    /// Compute summary statistics for the given route, fetching elevations
    /// from the terrain source.
    pub fn analyse<S: TerrainSource>(route: &Route, source: &S) -> Self {
        let pixel_size_m = source.resolution_m();

        let mut metrics = Self::default();

        let points = route.points();
        if points.is_empty() {
            return metrics;
        }

        let first = &points[0];
        let last = route.last();

        metrics.crow_flies_distance_m = distance_px(first, last) * pixel_size_m;

        let mut slope_sum_deg = 0.0;
        let mut slope_segments = 0usize;

        for (from, to) in route.segments() {
            let step_px = distance_px(from, to);
            let step_m = step_px * pixel_size_m;

            metrics.horizontal_distance_m += step_m;

            let elevations = match (source.value_at(from), source.value_at(to)) {
                (Ok(a), Ok(b)) if a.is_finite() && b.is_finite() => Some((a, b)),
                _ => None,
            };

            match elevations {
                Some((from_elev, to_elev)) => {
                    let rise = to_elev - from_elev;

                    metrics.total_distance_m += step_m.hypot(rise);
                    metrics.total_elevation_change += rise.abs();

                    if step_px > MIN_SLOPE_STEP_PX {
                        let slope_deg = rise.abs().atan2(step_m).to_degrees();

                        metrics.max_slope_deg = metrics.max_slope_deg.max(slope_deg);
                        slope_sum_deg += slope_deg;
                        slope_segments += 1;
                    }
                }
                // No usable elevation data, fall back to the horizontal
                // distance for this segment
                None => metrics.total_distance_m += step_m,
            }
        }

        if slope_segments > 0 {
            metrics.average_slope_deg = slope_sum_deg / slope_segments as f64;
        }

        // Net change needs only the endpoint elevations
        if let (Ok(start_elev), Ok(end_elev)) = (source.value_at(first), source.value_at(last)) {
            if start_elev.is_finite() && end_elev.is_finite() {
                metrics.net_elevation_change = end_elev - start_elev;
            }
        }

        metrics
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Euclidean distance between two pixels, in pixel units
fn distance_px(a: &Point2<i64>, b: &Point2<i64>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;

    dx.hypot(dy)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
