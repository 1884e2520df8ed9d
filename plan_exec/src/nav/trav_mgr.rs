//! # Traverse manager
//!
//! Drives the memory-bounded planning loop. Each iteration reads a bounded
//! terrain window around the current position, projects the goal into the
//! window, plans a slope-constrained path towards that sub-goal, and advances
//! the current position along the result. The loop ends when the current
//! position reaches the goal pixel, or with an error carrying the partial
//! route when it cannot.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::{debug, info, trace, warn};
use nalgebra::Point2;
use thiserror::Error;

use crate::{
    dem::{DemError, TerrainSource},
    nav::dijkstra::plan_step,
    route::Route,
};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Configuration for a traverse, immutable once the manager is built.
#[derive(Debug, Clone)]
pub struct TraverseConfig {
    /// Maximum tolerable terrain slope in degrees, in [0, 90]
    pub max_slope_deg: f64,

    /// Terrain window half-extent in pixels, bounding the planner's working
    /// set
    pub buffer: usize,

    /// Mask window corners beyond the buffer radius, modelling a circular
    /// perception horizon
    pub circular_windows: bool,
}

/// The traverse manager, which owns the traversal state for one traverse
/// across the raster.
pub struct TravMgr<'a, S: TerrainSource> {
    source: &'a S,

    config: TraverseConfig,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Errors which end a traverse.
///
/// Configuration errors surface before any planning and carry no route. The
/// remaining variants carry the partial route planned up to the failing
/// iteration, accessible through [`PlanError::partial_route`].
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Start position ({0}, {1}) is outside the raster")]
    StartOutsideRaster(i64, i64),

    #[error("Goal position ({0}, {1}) is outside the raster")]
    GoalOutsideRaster(i64, i64),

    #[error("Maximum slope must be between 0 and 90 degrees, got {0}")]
    SlopeOutOfRange(f64),

    #[error("Window buffer must be at least 1 pixel")]
    ZeroBuffer,

    #[error("Failed to read the terrain window around ({x}, {y}): {source}")]
    WindowReadFailure {
        x: i64,
        y: i64,
        #[source]
        source: DemError,
        route: Route,
    },

    #[error("No feasible path under the slope limit from ({x}, {y})")]
    Unreachable { x: i64, y: i64, route: Route },

    #[error("Planner made no progress from ({x}, {y})")]
    NoProgress { x: i64, y: i64, route: Route },
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl PlanError {
    /// The route planned up to the point of failure, `None` for
    /// configuration errors raised before planning began.
    pub fn partial_route(&self) -> Option<&Route> {
        match self {
            PlanError::WindowReadFailure { route, .. }
            | PlanError::Unreachable { route, .. }
            | PlanError::NoProgress { route, .. } => Some(route),
            _ => None,
        }
    }
}

impl<'a, S: TerrainSource> TravMgr<'a, S> {
    /// Create a new traverse manager over the given terrain source.
    ///
    /// Fails if the configuration is invalid.
    pub fn new(source: &'a S, config: TraverseConfig) -> Result<Self, PlanError> {
        if !(0.0..=90.0).contains(&config.max_slope_deg) {
            return Err(PlanError::SlopeOutOfRange(config.max_slope_deg));
        }

        if config.buffer == 0 {
            return Err(PlanError::ZeroBuffer);
        }

        Ok(Self { source, config })
    }

    /// Run the traverse from `start_px` to `goal_px`.
    ///
    /// On success the returned route starts at `start_px`, ends at
    /// `goal_px`, and every consecutive pair of pixels is 8-connected and
    /// within the slope limit. A traverse from a pixel to itself is the
    /// single-pixel route.
    pub fn run(&self, start_px: Point2<i64>, goal_px: Point2<i64>) -> Result<Route, PlanError> {
        if !self.source.contains(&start_px) {
            return Err(PlanError::StartOutsideRaster(start_px.x, start_px.y));
        }
        if !self.source.contains(&goal_px) {
            return Err(PlanError::GoalOutsideRaster(goal_px.x, goal_px.y));
        }

        let pixel_size_m = self.source.resolution_m();

        // The Chebyshev distance is the minimum possible number of steps, a
        // sensible initial capacity for the route
        let capacity_hint = (goal_px.x - start_px.x)
            .abs()
            .max((goal_px.y - start_px.y).abs()) as usize
            + 1;

        let mut route = Route::from_start(start_px, capacity_hint);
        let mut current = start_px;
        let mut iterations = 0usize;

        while current != goal_px {
            iterations += 1;

            let mut window = match self.source.read_square_window(&current, self.config.buffer) {
                Ok(w) => w,
                Err(e) => {
                    return Err(PlanError::WindowReadFailure {
                        x: current.x,
                        y: current.y,
                        source: e,
                        route,
                    })
                }
            };

            if self.config.circular_windows {
                window.mask_circle(self.config.buffer);
            }

            // Project the true goal into the window: the window cell closest
            // to it. Circular windows additionally pull the sub-goal inside
            // the mask radius so it never lands on a masked corner.
            let local_current = window.centre();
            let mut local_goal = window.clamp_to_window(&goal_px);
            if self.config.circular_windows {
                local_goal = clamp_to_radius(local_current, local_goal, self.config.buffer);
            }

            trace!(
                "Iteration {}: {}x{} window anchored at ({}, {}), sub-goal ({}, {})",
                iterations,
                window.width(),
                window.height(),
                window.anchor().x,
                window.anchor().y,
                local_goal.x,
                local_goal.y
            );

            let local_path = plan_step(
                &window,
                local_current,
                local_goal,
                self.config.max_slope_deg,
                pixel_size_m,
            );

            if local_path.is_empty() {
                warn!(
                    "No feasible path within the window at ({}, {})",
                    current.x, current.y
                );
                return Err(PlanError::Unreachable {
                    x: current.x,
                    y: current.y,
                    route,
                });
            }

            // Rebase the local path onto the raster and append it, the
            // leading cell duplicates the current position and is dropped
            let appended = route.append_leg(local_path.iter().map(|local| window.to_global(local)));

            if appended == 0 {
                return Err(PlanError::NoProgress {
                    x: current.x,
                    y: current.y,
                    route,
                });
            }

            current = *route.last();

            debug!(
                "Iteration {}: advanced to ({}, {}), {} pixels routed",
                iterations,
                current.x,
                current.y,
                route.len()
            );
        }

        info!(
            "Traverse complete in {} iterations, {} route pixels",
            iterations,
            route.len()
        );

        Ok(route)
    }
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Pull a sub-goal to within `radius` cells of the window centre, preserving
/// its direction. Components round toward the centre so the result stays
/// inside the circle.
fn clamp_to_radius(centre: Point2<usize>, goal: Point2<usize>, radius: usize) -> Point2<usize> {
    let dx = goal.x as f64 - centre.x as f64;
    let dy = goal.y as f64 - centre.y as f64;

    let dist = dx.hypot(dy);
    if dist <= radius as f64 {
        return goal;
    }

    let scale = radius as f64 / dist;

    let clamp_axis = |origin: usize, delta: f64| -> usize {
        let scaled = origin as f64 + delta * scale;
        if delta >= 0.0 {
            scaled.floor() as usize
        } else {
            scaled.ceil() as usize
        }
    };

    Point2::new(clamp_axis(centre.x, dx), clamp_axis(centre.y, dy))
}

// -----------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Plan a traverse from `start_px` to `goal_px` across the given terrain
/// source.
///
/// This is the planner's public surface: it validates the configuration,
/// runs the memory-bounded planning loop, and returns the full route or the
/// error which ended it.
pub fn plan_traverse<S: TerrainSource>(
    source: &S,
    start_px: Point2<i64>,
    goal_px: Point2<i64>,
    config: &TraverseConfig,
) -> Result<Route, PlanError> {
    TravMgr::new(source, config.clone())?.run(start_px, goal_px)
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use ndarray::{arr2, Array2};

    use crate::dem::GridDem;

    use super::*;

    fn config(max_slope_deg: f64, buffer: usize) -> TraverseConfig {
        TraverseConfig {
            max_slope_deg,
            buffer,
            circular_windows: false,
        }
    }

    /// A 5x5 map with a 46-unit wall down column x = 2
    fn wall_dem() -> GridDem {
        GridDem::new(arr2(&[
            [0.0, 0.0, 46.0, 0.0, 0.0],
            [0.0, 0.0, 46.0, 0.0, 0.0],
            [0.0, 0.0, 46.0, 0.0, 0.0],
            [0.0, 0.0, 46.0, 0.0, 0.0],
            [0.0, 0.0, 46.0, 0.0, 0.0],
        ]))
    }

    /// Check the route is a valid traverse from start to goal: endpoints
    /// match and every step is 8-connected
    fn assert_valid_route(route: &Route, start: Point2<i64>, goal: Point2<i64>) {
        assert_eq!(route.points()[0], start);
        assert_eq!(*route.last(), goal);

        for (from, to) in route.segments() {
            let dx = (to.x - from.x).abs();
            let dy = (to.y - from.y).abs();
            assert_eq!(dx.max(dy), 1, "step {:?} -> {:?}", from, to);
        }
    }

    #[test]
    fn test_invalid_configurations() {
        let dem = GridDem::new(Array2::zeros((5, 5)));

        assert!(matches!(
            plan_traverse(
                &dem,
                Point2::new(0, 0),
                Point2::new(4, 4),
                &config(-1.0, 4)
            ),
            Err(PlanError::SlopeOutOfRange(_))
        ));
        assert!(matches!(
            plan_traverse(
                &dem,
                Point2::new(0, 0),
                Point2::new(4, 4),
                &config(90.1, 4)
            ),
            Err(PlanError::SlopeOutOfRange(_))
        ));
        assert!(matches!(
            plan_traverse(
                &dem,
                Point2::new(0, 0),
                Point2::new(4, 4),
                &config(45.0, 0)
            ),
            Err(PlanError::ZeroBuffer)
        ));
        assert!(matches!(
            plan_traverse(
                &dem,
                Point2::new(-1, 0),
                Point2::new(4, 4),
                &config(45.0, 4)
            ),
            Err(PlanError::StartOutsideRaster(-1, 0))
        ));
        assert!(matches!(
            plan_traverse(
                &dem,
                Point2::new(0, 0),
                Point2::new(4, 5),
                &config(45.0, 4)
            ),
            Err(PlanError::GoalOutsideRaster(4, 5))
        ));
    }

    #[test]
    fn test_flat_single_window() {
        // The whole map fits in one window, the route is the pure diagonal
        let dem = GridDem::new(Array2::zeros((5, 5)));

        let route = plan_traverse(
            &dem,
            Point2::new(0, 0),
            Point2::new(4, 4),
            &config(45.0, 4),
        )
        .unwrap();

        assert_eq!(route.len(), 5);
        assert_valid_route(&route, Point2::new(0, 0), Point2::new(4, 4));
    }

    #[test]
    fn test_wall_detour_within_column() {
        // A goal on the near side of the wall never needs to cross it
        let dem = wall_dem();

        let route = plan_traverse(
            &dem,
            Point2::new(0, 0),
            Point2::new(0, 4),
            &config(45.0, 4),
        )
        .unwrap();

        assert_eq!(route.len(), 5);
        assert!(route.points().iter().all(|p| p.x == 0));
    }

    #[test]
    fn test_wall_unreachable() {
        // A goal behind the wall fails with the start-only partial route
        let dem = wall_dem();

        let result = plan_traverse(
            &dem,
            Point2::new(0, 0),
            Point2::new(4, 4),
            &config(45.0, 4),
        );

        match result {
            Err(PlanError::Unreachable { x, y, route }) => {
                assert_eq!((x, y), (0, 0));
                assert_eq!(route.points(), &[Point2::new(0, 0)]);
            }
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_window_traverse() {
        // Buffer 2 on a 10x10 map forces the controller through several
        // windows, each advancing by at most the buffer in each axis
        let dem = GridDem::new(Array2::zeros((10, 10)));

        let route = plan_traverse(
            &dem,
            Point2::new(0, 0),
            Point2::new(9, 9),
            &config(45.0, 2),
        )
        .unwrap();

        assert_eq!(route.len(), 10);
        assert_valid_route(&route, Point2::new(0, 0), Point2::new(9, 9));
    }

    #[test]
    fn test_ramp_blocks_x_travel() {
        // Elevation 10 * x: every step in x is ~84 degrees, far beyond the
        // 20 degree limit, while travel in y is flat
        let dem = GridDem::new(Array2::from_shape_fn((10, 10), |(_, x)| 10.0 * x as f64));

        // Moving within a column is fine
        let route = plan_traverse(
            &dem,
            Point2::new(0, 0),
            Point2::new(0, 9),
            &config(20.0, 4),
        )
        .unwrap();
        assert!(route.points().iter().all(|p| p.x == 0));

        // Crossing the ramp is not
        let result = plan_traverse(
            &dem,
            Point2::new(0, 0),
            Point2::new(9, 0),
            &config(20.0, 4),
        );

        match result {
            Err(PlanError::Unreachable { route, .. }) => {
                assert_eq!(route.points(), &[Point2::new(0, 0)]);
            }
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_trivial_traverse() {
        let dem = GridDem::new(Array2::zeros((5, 5)));

        let route = plan_traverse(
            &dem,
            Point2::new(3, 3),
            Point2::new(3, 3),
            &config(45.0, 4),
        )
        .unwrap();

        assert_eq!(route.points(), &[Point2::new(3, 3)]);
    }

    #[test]
    fn test_deterministic_routes() {
        let dem = GridDem::generate_random((32, 32), 0.08, 1.5, 7);

        let first = plan_traverse(
            &dem,
            Point2::new(1, 1),
            Point2::new(30, 30),
            &config(45.0, 6),
        )
        .unwrap();
        let second = plan_traverse(
            &dem,
            Point2::new(1, 1),
            Point2::new(30, 30),
            &config(45.0, 6),
        )
        .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_route_respects_slope_limit() {
        use crate::dem::TerrainSource;

        let dem = GridDem::generate_random((48, 48), 0.1, 2.0, 99);
        let max_slope_deg = 35.0;

        let route = plan_traverse(
            &dem,
            Point2::new(2, 2),
            Point2::new(45, 45),
            &config(max_slope_deg, 8),
        )
        .unwrap();

        assert_valid_route(&route, Point2::new(2, 2), Point2::new(45, 45));

        // Every step's terrain slope is within the limit
        for (from, to) in route.segments() {
            let rise = (dem.value_at(to).unwrap() - dem.value_at(from).unwrap()).abs();
            let diagonal = (to.x - from.x).abs() == 1 && (to.y - from.y).abs() == 1;
            let run = if diagonal {
                std::f64::consts::SQRT_2
            } else {
                1.0
            };

            let slope_deg = rise.atan2(run).to_degrees();
            assert!(slope_deg <= max_slope_deg + 1e-9);
        }
    }

    #[test]
    fn test_radius_clamping() {
        // In-radius goals are untouched
        assert_eq!(
            clamp_to_radius(Point2::new(3, 3), Point2::new(5, 3), 3),
            Point2::new(5, 3)
        );

        // Beyond the radius the sub-goal is pulled in along its direction
        assert_eq!(
            clamp_to_radius(Point2::new(0, 0), Point2::new(4, 4), 3),
            Point2::new(2, 2)
        );
        assert_eq!(
            clamp_to_radius(Point2::new(4, 4), Point2::new(0, 0), 3),
            Point2::new(2, 2)
        );
    }

    #[test]
    fn test_circular_window_traverse() {
        // Masked corners must not break an ordinary traverse
        let dem = GridDem::new(Array2::zeros((10, 10)));

        let route = plan_traverse(
            &dem,
            Point2::new(0, 0),
            Point2::new(9, 9),
            &TraverseConfig {
                max_slope_deg: 45.0,
                buffer: 3,
                circular_windows: true,
            },
        )
        .unwrap();

        assert_valid_route(&route, Point2::new(0, 0), Point2::new(9, 9));
    }
}
