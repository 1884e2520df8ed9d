//! # Elevation window
//!
//! A window is the bounded chunk of terrain the planner is allowed to hold in
//! memory at once: a rectangle of elevations clipped to the raster bounds,
//! anchored in raster coordinates, carrying the local index of the pixel it
//! was read around.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use ndarray::Array2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A rectangular window of elevation data clipped to the raster bounds.
///
/// Rows index the raster's y axis and columns its x axis, so cells are
/// addressed `data[[y, x]]`. Cells holding NaN (masked corners, raster
/// no-data) are impassable to the path engine.
#[derive(Debug, Clone)]
pub struct ElevationWindow {
    /// Elevation values, indexed `[y, x]`
    data: Array2<f64>,

    /// Raster pixel of the window's upper-left cell
    anchor: Point2<i64>,

    /// Local index of the pixel the window was read around
    centre: Point2<usize>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ElevationWindow {
    /// Build a window from clipped raster data.
    ///
    /// `anchor` is the raster coordinate of `data[[0, 0]]` and `centre` the
    /// local index of the query pixel the window was read around.
    pub fn new(data: Array2<f64>, anchor: Point2<i64>, centre: Point2<usize>) -> Self {
        Self {
            data,
            anchor,
            centre,
        }
    }

    /// Window width in pixels
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Window height in pixels
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raster pixel of the window's upper-left cell
    pub fn anchor(&self) -> Point2<i64> {
        self.anchor
    }

    /// Local index of the pixel the window was read around
    pub fn centre(&self) -> Point2<usize> {
        self.centre
    }

    /// The raw elevation data
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Elevation at the given local cell, `None` if outside the window.
    ///
    /// NaN elevations pass through, impassability is the path engine's
    /// concern.
    pub fn value(&self, local: &Point2<usize>) -> Option<f64> {
        self.data.get([local.y, local.x]).copied()
    }

    /// Rebase a raster pixel into window-local indices, `None` if the pixel
    /// lies outside the window.
    pub fn to_local(&self, pixel: &Point2<i64>) -> Option<Point2<usize>> {
        let lx = pixel.x - self.anchor.x;
        let ly = pixel.y - self.anchor.y;

        if lx < 0 || ly < 0 || lx >= self.width() as i64 || ly >= self.height() as i64 {
            None
        } else {
            Some(Point2::new(lx as usize, ly as usize))
        }
    }

    /// Rebase a window-local index into raster pixels
    pub fn to_global(&self, local: &Point2<usize>) -> Point2<i64> {
        Point2::new(
            self.anchor.x + local.x as i64,
            self.anchor.y + local.y as i64,
        )
    }

    /// Clamp a raster pixel to the window bounds, in local indices.
    ///
    /// The result is the window cell closest to the given pixel, used to
    /// project a goal outside the window onto its boundary.
    pub fn clamp_to_window(&self, pixel: &Point2<i64>) -> Point2<usize> {
        let lx = (pixel.x - self.anchor.x).max(0).min(self.width() as i64 - 1);
        let ly = (pixel.y - self.anchor.y).max(0).min(self.height() as i64 - 1);

        Point2::new(lx as usize, ly as usize)
    }

    /// Mask cells further than `radius` pixels from the window centre to NaN.
    ///
    /// Models a circular perception horizon, the masked corners become
    /// impassable.
    pub fn mask_circle(&mut self, radius: usize) {
        let centre = self.centre;
        let radius_sq = (radius * radius) as i64;

        for ((y, x), value) in self.data.indexed_iter_mut() {
            let dx = x as i64 - centre.x as i64;
            let dy = y as i64 - centre.y as i64;

            if dx * dx + dy * dy > radius_sq {
                *value = f64::NAN;
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
