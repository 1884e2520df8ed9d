//! # DEM parameters
//!
//! Per-deployment raster conventions which are not carried in the raster
//! itself, loaded from the optional TOML parameter file given on the command
//! line.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// DEM handling parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemParams {
    /// Scale factor applied to raw band values to obtain elevations in the
    /// same linear unit as the pixel size. 1.0 for rasters already in
    /// metres, 0.001 for millimetre rasters.
    pub elevation_scale: f64,

    /// Mask window corners beyond the buffer radius, modelling a circular
    /// perception horizon
    pub circular_windows: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DemParams {
    fn default() -> Self {
        Self {
            elevation_scale: 1.0,
            circular_windows: false,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
