//! # DEM access
//!
//! This module provides the planner's view of a Digital Elevation Model: a
//! georeferenced raster of terrain elevations which can only be read a
//! bounded window at a time. Production rasters are read through
//! [`GeoTiffDem`], tests and benchmarks use the in-memory [`GridDem`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// In-memory elevation rasters
pub mod grid;

/// Geotransform coordinate algebra
pub mod transform;

/// Windows of elevation data read around a pixel
pub mod window;

/// GDAL-backed raster access
#[cfg(feature = "gdal")]
pub mod geotiff;

// ------------------------------------------------------------------------------------------------
// RE-EXPORTS
// ------------------------------------------------------------------------------------------------

#[cfg(feature = "gdal")]
pub use geotiff::GeoTiffDem;
pub use grid::GridDem;
pub use transform::GeoTransform;
pub use window::ElevationWindow;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of terrain elevation data.
///
/// Implementations expose the raster's dimensions and georeferencing, and
/// read clipped elevation windows around a pixel of interest. Elevations
/// returned by a source are in the same linear unit as [`resolution_m`],
/// sources for rasters shipping other units (e.g. millimetres) apply their
/// configured scale before handing values out.
///
/// [`resolution_m`]: TerrainSource::resolution_m
pub trait TerrainSource {
    /// Raster width in pixels
    fn x_size(&self) -> usize;

    /// Raster height in pixels
    fn y_size(&self) -> usize;

    /// Metres per pixel, constant across the raster
    fn resolution_m(&self) -> f64;

    /// Convert a geographic coordinate into pixel indices.
    ///
    /// The result is not clipped and may lie outside the raster, callers
    /// check with [`TerrainSource::contains`].
    fn geo_to_pixel(&self, geo: &Point2<f64>) -> Point2<i64>;

    /// Convert pixel indices into the geographic coordinate of the pixel's
    /// origin
    fn pixel_to_geo(&self, pixel: &Point2<i64>) -> Point2<f64>;

    /// Read the square window of half-extent `buffer` centred on `centre`,
    /// clipped to the raster bounds.
    ///
    /// The returned window is at most `(2 * buffer + 1)` pixels on a side,
    /// smaller where the raster edge cuts it, and always contains `centre`.
    fn read_square_window(
        &self,
        centre: &Point2<i64>,
        buffer: usize,
    ) -> Result<ElevationWindow, DemError>;

    /// Elevation at a single pixel
    fn value_at(&self, pixel: &Point2<i64>) -> Result<f64, DemError>;

    /// True if the pixel lies inside the raster
    fn contains(&self, pixel: &Point2<i64>) -> bool {
        pixel.x >= 0
            && pixel.y >= 0
            && (pixel.x as usize) < self.x_size()
            && (pixel.y as usize) < self.y_size()
    }
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by terrain sources.
#[derive(Debug, Error)]
pub enum DemError {
    #[error("Requested pixel ({0}, {1}) is outside the raster")]
    OutsideRaster(i64, i64),

    #[error("The raster has non-square pixels ({x_size} x {y_size})")]
    NonSquarePixels { x_size: f64, y_size: f64 },

    #[error("The raster geotransform is rotated, only north-up rasters are supported")]
    RotatedRaster,

    #[error("Failed to read raster values: {0}")]
    ReadFailed(String),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}
