//! # Traverse planner library.
//!
//! Implements a memory-bounded traverse planner for planetary rovers. The
//! planner never holds more than a bounded window of the elevation raster: a
//! window is read around the rover's current position, a slope-constrained
//! shortest-path search is run inside it towards the goal's projection into
//! the window, and the rover advances along the result. The loop repeats
//! until the goal pixel is reached.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod args;
pub mod dem;
pub mod metrics;
pub mod nav;
pub mod params;
pub mod report;
pub mod route;
