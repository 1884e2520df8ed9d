//! # GeoTIFF DEM access
//!
//! GDAL-backed [`TerrainSource`], the production route onto planetary DEM
//! rasters. The raster's georeferencing is validated once at open: rotated or
//! non-square-pixel rasters are rejected, and the metric resolution is
//! computed up front (converting from angular units when the CRS is
//! geographic).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use gdal::Dataset;
use nalgebra::Point2;
use ndarray::Array2;

use super::{transform::GeoTransform, window::ElevationWindow, DemError, TerrainSource};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// DEM rasters carry their elevations in a single band
const ELEVATION_BAND: isize = 1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A georeferenced elevation raster read through GDAL.
pub struct GeoTiffDem {
    dataset: Dataset,

    transform: GeoTransform,

    /// Metres per pixel, computed once at open
    resolution_m: f64,

    raster_size: (usize, usize),

    /// The band's no-data marker, mapped to NaN on read
    no_data: Option<f64>,

    /// Scale applied to raw band values to obtain elevations in metres
    elevation_scale: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GeoTiffDem {
    /// Open the DEM raster at the given path.
    ///
    /// `elevation_scale` converts raw band values into metres (1.0 for rasters
    /// already in metres, 0.001 for millimetre rasters).
    ///
    /// Fails on unreadable rasters, rotated or non-square geotransforms, or a
    /// missing coordinate reference system.
    pub fn open<P: AsRef<Path>>(path: P, elevation_scale: f64) -> Result<Self, DemError> {
        let dataset = Dataset::open(path.as_ref())?;

        let transform = GeoTransform::new(dataset.geo_transform()?)?;

        // Angular-unit rasters are converted to metres along the body's
        // equator, linear-unit rasters use the pixel size directly
        let spatial_ref = dataset.spatial_ref()?;
        let resolution_m = if spatial_ref.is_geographic() {
            transform.resolution_angular_m(spatial_ref.semi_major()?)
        } else {
            transform.resolution_linear_m()
        };

        let raster_size = dataset.raster_size();
        let no_data = dataset.rasterband(ELEVATION_BAND)?.no_data_value();

        Ok(Self {
            dataset,
            transform,
            resolution_m,
            raster_size,
            no_data,
            elevation_scale,
        })
    }

    /// Convert a raw band value into an elevation, mapping no-data to NaN.
    fn to_elevation(&self, raw: f64) -> f64 {
        match self.no_data {
            Some(no_data) if raw == no_data => f64::NAN,
            _ => raw * self.elevation_scale,
        }
    }
}

impl TerrainSource for GeoTiffDem {
    fn x_size(&self) -> usize {
        self.raster_size.0
    }

    fn y_size(&self) -> usize {
        self.raster_size.1
    }

    fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    fn geo_to_pixel(&self, geo: &Point2<f64>) -> Point2<i64> {
        self.transform.geo_to_pixel(geo)
    }

    fn pixel_to_geo(&self, pixel: &Point2<i64>) -> Point2<f64> {
        self.transform.pixel_to_geo(pixel)
    }

    fn read_square_window(
        &self,
        centre: &Point2<i64>,
        buffer: usize,
    ) -> Result<ElevationWindow, DemError> {
        if !self.contains(centre) {
            return Err(DemError::OutsideRaster(centre.x, centre.y));
        }

        let buffer = buffer as i64;

        // Clip the window to the raster bounds
        let x_off = (centre.x - buffer).max(0);
        let y_off = (centre.y - buffer).max(0);
        let x_end = (centre.x + buffer + 1).min(self.x_size() as i64);
        let y_end = (centre.y + buffer + 1).min(self.y_size() as i64);

        let x_size = (x_end - x_off) as usize;
        let y_size = (y_end - y_off) as usize;

        let mut raw = vec![0f64; x_size * y_size];
        self.dataset.rasterband(ELEVATION_BAND)?.read_into_slice(
            (x_off as isize, y_off as isize),
            (x_size, y_size),
            (x_size, y_size),
            &mut raw,
            None,
        )?;

        let elevations: Vec<f64> = raw.into_iter().map(|v| self.to_elevation(v)).collect();

        let data = Array2::from_shape_vec((y_size, x_size), elevations)
            .map_err(|e| DemError::ReadFailed(e.to_string()))?;

        Ok(ElevationWindow::new(
            data,
            Point2::new(x_off, y_off),
            Point2::new((centre.x - x_off) as usize, (centre.y - y_off) as usize),
        ))
    }

    fn value_at(&self, pixel: &Point2<i64>) -> Result<f64, DemError> {
        if !self.contains(pixel) {
            return Err(DemError::OutsideRaster(pixel.x, pixel.y));
        }

        let mut raw = [0f64; 1];
        self.dataset.rasterband(ELEVATION_BAND)?.read_into_slice(
            (pixel.x as isize, pixel.y as isize),
            (1, 1),
            (1, 1),
            &mut raw,
            None,
        )?;

        Ok(self.to_elevation(raw[0]))
    }
}
