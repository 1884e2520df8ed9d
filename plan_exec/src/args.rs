//! # Command line arguments
//!
//! The planner's command line surface. Each traverse endpoint is given in
//! exactly one of two forms: a geographic `lon,lat` coordinate resolved
//! through the raster's geotransform, or a raw `x,y` pixel coordinate.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use nalgebra::Point2;

use crate::dem::TerrainSource;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Memory-bounded traverse planner for planetary DEMs.
///
/// Plans a slope-constrained route between two points of a georeferenced
/// elevation raster, reading only a bounded terrain window at a time.
#[derive(Debug, Parser)]
#[command(name = "plan_exec", version, about)]
#[command(group(ArgGroup::new("start_pos").required(true).args(["start", "start_pixel"])))]
#[command(group(ArgGroup::new("end_pos").required(true).args(["end", "end_pixel"])))]
pub struct Args {
    /// Geographic start coordinate
    #[arg(long, value_name = "LON,LAT", value_parser = parse_geo_pair, allow_hyphen_values = true)]
    pub start: Option<(f64, f64)>,

    /// Pixel start coordinate
    #[arg(long, value_name = "X,Y", value_parser = parse_pixel_pair)]
    pub start_pixel: Option<(i64, i64)>,

    /// Geographic goal coordinate
    #[arg(long, value_name = "LON,LAT", value_parser = parse_geo_pair, allow_hyphen_values = true)]
    pub end: Option<(f64, f64)>,

    /// Pixel goal coordinate
    #[arg(long, value_name = "X,Y", value_parser = parse_pixel_pair)]
    pub end_pixel: Option<(i64, i64)>,

    /// Path to the input DEM raster
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Path to the output route file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Maximum tolerable slope in degrees, in (0, 90]
    #[arg(long, value_name = "DEG", value_parser = parse_slope)]
    pub slope: f64,

    /// Terrain window half-extent in pixels
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    pub buffer: u32,

    /// Write the output as JSON instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Path to the optional DEM parameter file
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Args {
    /// Resolve the start position into raster pixel coordinates
    pub fn start_px<S: TerrainSource>(&self, source: &S) -> Point2<i64> {
        Self::resolve(self.start, self.start_pixel, source)
    }

    /// Resolve the goal position into raster pixel coordinates
    pub fn end_px<S: TerrainSource>(&self, source: &S) -> Point2<i64> {
        Self::resolve(self.end, self.end_pixel, source)
    }

    fn resolve<S: TerrainSource>(
        geo: Option<(f64, f64)>,
        pixel: Option<(i64, i64)>,
        source: &S,
    ) -> Point2<i64> {
        match (geo, pixel) {
            (Some((lon, lat)), _) => source.geo_to_pixel(&Point2::new(lon, lat)),
            (_, Some((x, y))) => Point2::new(x, y),
            _ => unreachable!("clap enforces exactly one endpoint form"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_geo_pair(value: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = split_pair(value)?;

    Ok((
        lon.parse().map_err(|_| format!("invalid ordinate {:?}", lon))?,
        lat.parse().map_err(|_| format!("invalid ordinate {:?}", lat))?,
    ))
}

fn parse_pixel_pair(value: &str) -> Result<(i64, i64), String> {
    let (x, y) = split_pair(value)?;

    Ok((
        x.parse().map_err(|_| format!("invalid pixel index {:?}", x))?,
        y.parse().map_err(|_| format!("invalid pixel index {:?}", y))?,
    ))
}

fn split_pair(value: &str) -> Result<(&str, &str), String> {
    let mut parts = value.splitn(2, ',');

    match (parts.next(), parts.next()) {
        (Some(a), Some(b)) => Ok((a.trim(), b.trim())),
        _ => Err(format!("expected two comma-separated values, got {:?}", value)),
    }
}

fn parse_slope(value: &str) -> Result<f64, String> {
    let slope: f64 = value
        .parse()
        .map_err(|_| format!("invalid slope {:?}", value))?;

    if slope > 0.0 && slope <= 90.0 {
        Ok(slope)
    } else {
        Err(format!("slope must be in (0, 90], got {}", slope))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "plan_exec",
            "--input",
            "dem.tif",
            "--output",
            "route.txt",
            "--slope",
            "25",
            "--buffer",
            "64",
        ]
    }

    #[test]
    fn test_pixel_endpoints() {
        let mut argv = base_args();
        argv.extend(["--start-pixel", "10,20", "--end-pixel", "300,400"]);

        let args = Args::try_parse_from(argv).unwrap();

        assert_eq!(args.start_pixel, Some((10, 20)));
        assert_eq!(args.end_pixel, Some((300, 400)));
        assert_eq!(args.slope, 25.0);
        assert_eq!(args.buffer, 64);
    }

    #[test]
    fn test_geo_endpoints() {
        let mut argv = base_args();
        argv.extend(["--start", "-12.5,4.25", "--end", "-11.75,5.0"]);

        let args = Args::try_parse_from(argv).unwrap();

        assert_eq!(args.start, Some((-12.5, 4.25)));
        assert_eq!(args.end, Some((-11.75, 5.0)));
    }

    #[test]
    fn test_endpoint_forms_are_exclusive() {
        // Both forms for one endpoint
        let mut argv = base_args();
        argv.extend([
            "--start",
            "1.0,2.0",
            "--start-pixel",
            "1,2",
            "--end-pixel",
            "3,4",
        ]);
        assert!(Args::try_parse_from(argv).is_err());

        // Missing goal entirely
        let mut argv = base_args();
        argv.extend(["--start-pixel", "1,2"]);
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_validation_bounds() {
        // Slope outside (0, 90]
        let mut argv = base_args();
        argv.extend(["--start-pixel", "1,2", "--end-pixel", "3,4"]);
        let argv: Vec<String> = argv
            .into_iter()
            .map(|s| if s == "25" { "91".into() } else { s.to_string() })
            .collect();
        assert!(Args::try_parse_from(argv).is_err());

        // Zero buffer
        let mut argv = base_args();
        argv.extend(["--start-pixel", "1,2", "--end-pixel", "3,4"]);
        let argv: Vec<String> = argv
            .into_iter()
            .map(|s| if s == "64" { "0".into() } else { s.to_string() })
            .collect();
        assert!(Args::try_parse_from(argv).is_err());
    }
}
