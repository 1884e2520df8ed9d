//! # Navigation
//!
//! The planning core: a slope-constrained shortest-path engine which works on
//! one elevation window at a time, and the traverse manager which drives it
//! window by window from the start pixel to the goal.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Slope-constrained shortest-path search over one elevation window
pub mod dijkstra;

/// The memory-bounded traverse loop
pub mod trav_mgr;

// ------------------------------------------------------------------------------------------------
// RE-EXPORTS
// ------------------------------------------------------------------------------------------------

pub use trav_mgr::{plan_traverse, PlanError, TravMgr, TraverseConfig};
