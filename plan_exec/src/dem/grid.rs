//! # In-memory DEM
//!
//! [`GridDem`] holds a whole elevation raster in memory. It backs the test
//! suite and benchmarks, and can generate rolling synthetic terrain from
//! Perlin noise.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use ndarray::{s, Array2};
use noise::{NoiseFn, Perlin, Seedable};

use super::{transform::GeoTransform, window::ElevationWindow, DemError, TerrainSource};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An in-memory elevation raster.
pub struct GridDem {
    /// Elevation values, indexed `[y, x]`
    data: Array2<f64>,

    transform: GeoTransform,

    resolution_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GridDem {
    /// Create a DEM over the given elevation grid with 1 m unit pixels.
    pub fn new(data: Array2<f64>) -> Self {
        Self {
            data,
            transform: GeoTransform::unit(),
            resolution_m: 1.0,
        }
    }

    /// Create a DEM with the given geotransform and metric resolution.
    pub fn with_transform(data: Array2<f64>, transform: GeoTransform, resolution_m: f64) -> Self {
        Self {
            data,
            transform,
            resolution_m,
        }
    }

    /// Generate rolling terrain using a Perlin noise system.
    ///
    /// `scale` sets the horizontal feature size (smaller is smoother) and
    /// `amplitude_m` the elevation range.
    pub fn generate_random(
        num_cells: (usize, usize),
        scale: f64,
        amplitude_m: f64,
        seed: u32,
    ) -> Self {
        let perlin = Perlin::new().set_seed(seed);

        let (x_size, y_size) = num_cells;

        let data = Array2::from_shape_fn((y_size, x_size), |(y, x)| {
            amplitude_m * perlin.get([x as f64 * scale, y as f64 * scale])
        });

        Self::new(data)
    }
}

impl TerrainSource for GridDem {
    fn x_size(&self) -> usize {
        self.data.ncols()
    }

    fn y_size(&self) -> usize {
        self.data.nrows()
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

        let data = self
            .data
            .slice(s![
                y_off as usize..y_end as usize,
                x_off as usize..x_end as usize
            ])
            .to_owned();

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

        Ok(self.data[[pixel.y as usize, pixel.x as usize]])
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_window_clipping() -> Result<(), DemError> {
        let dem = GridDem::generate_random((10, 10), 0.1, 1.0, 42);

        // Interior windows are full size with the query pixel at their centre
        let window = dem.read_square_window(&Point2::new(5, 5), 2)?;
        assert_eq!((window.width(), window.height()), (5, 5));
        assert_eq!(window.anchor(), Point2::new(3, 3));
        assert_eq!(window.centre(), Point2::new(2, 2));

        // Windows at the raster corner are clipped, the local index still
        // identifies the query pixel
        let window = dem.read_square_window(&Point2::new(0, 0), 2)?;
        assert_eq!((window.width(), window.height()), (3, 3));
        assert_eq!(window.anchor(), Point2::new(0, 0));
        assert_eq!(window.centre(), Point2::new(0, 0));

        let window = dem.read_square_window(&Point2::new(9, 9), 2)?;
        assert_eq!((window.width(), window.height()), (3, 3));
        assert_eq!(window.anchor(), Point2::new(7, 7));
        assert_eq!(window.centre(), Point2::new(2, 2));

        // The window carries the same elevations as the raster
        let window = dem.read_square_window(&Point2::new(4, 7), 1)?;
        for y in 0..3usize {
            for x in 0..3usize {
                let global = window.to_global(&Point2::new(x, y));
                assert_eq!(
                    window.value(&Point2::new(x, y)),
                    Some(dem.value_at(&global)?)
                );
            }
        }

        Ok(())
    }

    #[test]
    fn test_georeferenced_grid() -> Result<(), DemError> {
        let transform = GeoTransform::new([100.0, 2.0, 0.0, 500.0, 0.0, -2.0])?;
        let dem = GridDem::with_transform(Array2::zeros((4, 4)), transform, 2.0);

        assert_eq!(
            dem.geo_to_pixel(&Point2::new(104.5, 495.0)),
            Point2::new(2, 2)
        );
        assert_eq!(
            dem.pixel_to_geo(&Point2::new(2, 2)),
            Point2::new(104.0, 496.0)
        );
        assert_eq!(dem.resolution_m(), 2.0);

        Ok(())
    }

    #[test]
    fn test_out_of_raster_reads() {
        let dem = GridDem::generate_random((10, 10), 0.1, 1.0, 42);

        assert!(dem.read_square_window(&Point2::new(-1, 0), 2).is_err());
        assert!(dem.read_square_window(&Point2::new(0, 10), 2).is_err());
        assert!(dem.value_at(&Point2::new(10, 0)).is_err());
    }
}
