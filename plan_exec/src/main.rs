//! Traverse planner executable entry point.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use clap::Parser;
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn, LevelFilter};

// Internal
use plan_lib::{
    args::Args,
    dem::{GeoTiffDem, TerrainSource},
    metrics::RouteMetrics,
    nav::{plan_traverse, TraverseConfig},
    params::DemParams,
    report::TraverseReport,
};
use util::{logger::logger_init, params, session::Session};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Initialise session
    let session =
        Session::new("plan_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Load the DEM parameter file if one was given
    let dem_params: DemParams = match &args.params {
        Some(path) => params::load(path).wrap_err("Failed to load the DEM parameter file")?,
        None => DemParams::default(),
    };

    // Open the DEM
    let dem = GeoTiffDem::open(&args.input, dem_params.elevation_scale)
        .wrap_err_with(|| format!("Failed to open the DEM {:?}", args.input))?;

    info!(
        "DEM is {}x{} pixels at {:.3} m/px",
        dem.x_size(),
        dem.y_size(),
        dem.resolution_m()
    );

    // Resolve the endpoints into pixel coordinates
    let start_px = args.start_px(&dem);
    let goal_px = args.end_px(&dem);

    info!(
        "Planning traverse from ({}, {}) to ({}, {}) with slope limit {} deg and buffer {} px",
        start_px.x, start_px.y, goal_px.x, goal_px.y, args.slope, args.buffer
    );

    let config = TraverseConfig {
        max_slope_deg: args.slope,
        buffer: args.buffer as usize,
        circular_windows: dem_params.circular_windows,
    };

    // Plan the traverse
    let route = plan_traverse(&dem, start_px, goal_px, &config)
        .map_err(|e| {
            // Keep any partial route for diagnosis before bailing out
            if let Some(partial) = e.partial_route() {
                warn!("Traverse failed with {} pixels routed", partial.len());
                session.save("partial_route.json", partial);
            }
            e
        })
        .wrap_err("Traverse failed")?;

    info!("Route planned with {} pixels", route.len());

    // Summarise the route
    let metrics = RouteMetrics::analyse(&route, &dem);

    info!(
        "Total distance {:.1} m over {:.1} m horizontal, max slope {:.1} deg",
        metrics.total_distance_m, metrics.horizontal_distance_m, metrics.max_slope_deg
    );

    let report = TraverseReport { route, metrics };

    // Write the output, plus a session copy of the full report
    if args.json {
        report.write_json(&args.output)
    } else {
        report.write_text(&args.output)
    }
    .wrap_err_with(|| format!("Failed to write the route to {:?}", args.output))?;

    session.save("report.json", &report);

    info!("Route written to {:?}", args.output);

    Ok(())
}
