//! # Route
//!
//! This module defines the route produced by a traverse: the ordered sequence
//! of raster pixels the rover is to visit.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered sequence of raster pixel coordinates.
///
/// A route is never empty: it is created from its start pixel, and on a
/// completed traverse its consecutive elements are 8-connected (Chebyshev
/// distance 1) with the goal pixel last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<Point2<i64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Route {
    /// Create a new route starting at the given pixel.
    ///
    /// `capacity_hint` is the expected number of route pixels, callers use the
    /// Chebyshev distance between start and goal to avoid repeated
    /// reallocation while the route grows.
    pub fn from_start(start: Point2<i64>, capacity_hint: usize) -> Self {
        let mut points = Vec::with_capacity(capacity_hint.max(1));
        points.push(start);

        Self { points }
    }

    /// Append a leg of pixels to the route, returning how many were appended.
    ///
    /// Points equal to the current route tail are dropped, which removes the
    /// leading cell of a planned leg duplicating the position it was planned
    /// from.
    pub fn append_leg<I>(&mut self, leg: I) -> usize
    where
        I: IntoIterator<Item = Point2<i64>>,
    {
        let mut appended = 0;

        for point in leg {
            if self.points.last() == Some(&point) {
                continue;
            }

            self.points.push(point);
            appended += 1;
        }

        appended
    }

    /// The last routed pixel
    pub fn last(&self) -> &Point2<i64> {
        // The unwrap here is safe since routes are created non-empty and
        // never shrink
        self.points.last().unwrap()
    }

    /// Get the number of pixels in the route
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The routed pixels in traverse order
    pub fn points(&self) -> &[Point2<i64>] {
        &self.points
    }

    /// Iterate over consecutive route segments as (from, to) pairs
    pub fn segments(&self) -> impl Iterator<Item = (&Point2<i64>, &Point2<i64>)> {
        self.points.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_append_leg() {
        let mut route = Route::from_start(Point2::new(0, 0), 4);

        // The leading cell of a leg duplicates the route tail and is dropped
        let appended = route.append_leg(vec![
            Point2::new(0, 0),
            Point2::new(1, 1),
            Point2::new(2, 2),
        ]);

        assert_eq!(appended, 2);
        assert_eq!(route.len(), 3);
        assert_eq!(*route.last(), Point2::new(2, 2));

        // Legs which only contain the tail append nothing
        assert_eq!(route.append_leg(vec![Point2::new(2, 2)]), 0);
        assert_eq!(route.len(), 3);
    }

    #[test]
    fn test_segments() {
        let mut route = Route::from_start(Point2::new(0, 0), 3);
        route.append_leg(vec![Point2::new(1, 0), Point2::new(2, 1)]);

        let segments: Vec<_> = route.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[0],
            (&Point2::new(0, 0), &Point2::new(1, 0))
        );
        assert_eq!(
            segments[1],
            (&Point2::new(1, 0), &Point2::new(2, 1))
        );
    }
}
