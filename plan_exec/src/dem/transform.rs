//! # Geotransform algebra
//!
//! Maps between geographic coordinates and raster pixel indices using the six
//! affine geotransform coefficients carried by georeferenced rasters.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;

use super::DemError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The affine mapping between raster pixel indices and geographic ordinates.
///
/// With coefficients `a0..a5`:
///
/// ```text
/// x_geo = a0 + a1 * x + a2 * y
/// y_geo = a3 + a4 * x + a5 * y
/// ```
///
/// Only north-up rasters with square pixels are accepted: `a2 = a4 = 0` and
/// `a1 = |a5|`, checked at construction.
#[derive(Debug, Clone, Copy)]
pub struct GeoTransform {
    coeffs: [f64; 6],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GeoTransform {
    /// Build a new geotransform from the raw raster coefficients.
    ///
    /// Fails if the raster is rotated or its pixels aren't square.
    pub fn new(coeffs: [f64; 6]) -> Result<Self, DemError> {
        if coeffs[2] != 0.0 || coeffs[4] != 0.0 {
            return Err(DemError::RotatedRaster);
        }

        if coeffs[1] != coeffs[5].abs() {
            return Err(DemError::NonSquarePixels {
                x_size: coeffs[1],
                y_size: coeffs[5].abs(),
            });
        }

        Ok(Self { coeffs })
    }

    /// A north-up geotransform with unit pixels, used by in-memory rasters.
    pub fn unit() -> Self {
        Self {
            coeffs: [0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
        }
    }

    /// Pixel size in the CRS's own units
    pub fn pixel_size(&self) -> f64 {
        self.coeffs[1]
    }

    /// Convert a geographic coordinate into pixel indices.
    ///
    /// Truncates toward zero and performs no bounds clipping, so the result
    /// may lie outside the raster.
    pub fn geo_to_pixel(&self, geo: &Point2<f64>) -> Point2<i64> {
        Point2::new(
            ((geo.x - self.coeffs[0]) / self.coeffs[1]) as i64,
            ((geo.y - self.coeffs[3]) / self.coeffs[5]) as i64,
        )
    }

    /// Convert pixel indices into the geographic coordinate of the pixel's
    /// origin
    pub fn pixel_to_geo(&self, pixel: &Point2<i64>) -> Point2<f64> {
        Point2::new(
            self.coeffs[0] + pixel.x as f64 * self.coeffs[1],
            self.coeffs[3] + pixel.y as f64 * self.coeffs[5],
        )
    }

    /// Metres per pixel for a CRS with linear (metre) units
    pub fn resolution_linear_m(&self) -> f64 {
        self.pixel_size()
    }

    /// Metres per pixel for a geographic CRS with angular (degree) units.
    ///
    /// The pixel size in degrees is converted along the body's equator using
    /// the CRS's semi-major axis.
    pub fn resolution_angular_m(&self, semi_major_axis_m: f64) -> f64 {
        self.pixel_size() * std::f64::consts::PI * semi_major_axis_m / 180.0
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
