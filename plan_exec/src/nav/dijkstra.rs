//! # Constrained shortest-path engine
//!
//! Plans minimum 3D-distance paths across one elevation window using
//! Dijkstra's algorithm over the 8-connected cell graph. An edge between two
//! cells exists only if its terrain slope is within the configured limit and
//! both cells hold finite elevations, so the returned path is traversable by
//! construction.
//!
//! Each invocation owns its search state: a flat arena of per-cell nodes
//! allocated on entry and dropped on return. Nothing survives between calls.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use nalgebra::Point2;
use ordered_float::OrderedFloat;

use crate::dem::ElevationWindow;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Per-cell search state, living for one [`plan_step`] invocation.
struct SearchNode {
    /// Cell elevation, NaN for masked or no-data cells
    elev: f64,

    /// Best known distance from the start cell
    dist: f64,

    /// Arena index of the predecessor on the best known path
    prev: Option<u32>,

    visited: bool,

    /// Cached arena indices of the 8-connected neighbours
    neighbours: Vec<u32>,
}

/// Priority queue entry, ordered so the smallest distance pops first with
/// FIFO ordering between equal distances.
struct QueueEntry {
    dist: OrderedFloat<f64>,

    /// Insertion sequence number, the tie-break on equal distances
    seq: u64,

    /// Arena index of the queued cell
    index: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Note that we flip the order here so that the heap will be a
        // min-heap, not a max-heap
        other
            .dist
            .cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Plan the minimum 3D-distance path from `start` to `goal` across the
/// window.
///
/// Every step of the returned path connects 8-connected cells whose terrain
/// slope is at most `max_slope_deg` (inclusive). The path contains both
/// endpoints in start-to-goal order, and collapses to a single cell when
/// `start == goal`.
///
/// The empty path is returned when the window is empty, either endpoint is
/// outside it, or no feasible path to the goal exists under the slope limit.
/// This function never panics.
pub fn plan_step(
    window: &ElevationWindow,
    start: Point2<usize>,
    goal: Point2<usize>,
    max_slope_deg: f64,
    pixel_size_m: f64,
) -> Vec<Point2<usize>> {
    if window.is_empty() {
        return Vec::new();
    }

    let width = window.width();
    let height = window.height();

    if start.x >= width || start.y >= height || goal.x >= width || goal.y >= height {
        return Vec::new();
    }

    let mut arena = build_arena(window);

    let start_index = (start.y * width + start.x) as u32;
    let goal_index = (goal.y * width + goal.x) as u32;

    arena[start_index as usize].dist = 0.0;

    let mut queue = BinaryHeap::new();
    let mut seq = 0u64;

    queue.push(QueueEntry {
        dist: OrderedFloat(0.0),
        seq,
        index: start_index,
    });

    while let Some(entry) = queue.pop() {
        let current = entry.index;

        // Stale queue entries are skipped rather than removed on relaxation
        if arena[current as usize].visited {
            continue;
        }
        arena[current as usize].visited = true;

        if current == goal_index {
            return reconstruct(&arena, goal_index, width);
        }

        let current_elev = arena[current as usize].elev;
        let current_dist = arena[current as usize].dist;

        // Masked cells have no outgoing edges
        if !current_elev.is_finite() {
            continue;
        }

        // A visited node never expands again, so its neighbour cache can be
        // taken rather than cloned
        let neighbours = std::mem::take(&mut arena[current as usize].neighbours);

        for neighbour_index in neighbours {
            let neighbour = &mut arena[neighbour_index as usize];

            if neighbour.visited || !neighbour.elev.is_finite() {
                continue;
            }

            let rise = (neighbour.elev - current_elev).abs();
            let run = if is_diagonal(current, neighbour_index, width) {
                pixel_size_m * SQRT_2
            } else {
                pixel_size_m
            };

            // Inclusive comparison: terrain at exactly the limit is passable
            let slope_deg = rise.atan2(run).to_degrees();
            if slope_deg > max_slope_deg {
                continue;
            }

            let alt = current_dist + run.hypot(rise);
            if alt < neighbour.dist {
                neighbour.dist = alt;
                neighbour.prev = Some(current);

                seq += 1;
                queue.push(QueueEntry {
                    dist: OrderedFloat(alt),
                    seq,
                    index: neighbour_index,
                });
            }
        }
    }

    // The queue drained without popping the goal: it is unreachable under
    // the slope limit
    Vec::new()
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the search arena over the window's cells
fn build_arena(window: &ElevationWindow) -> Vec<SearchNode> {
    let width = window.width();
    let height = window.height();

    let mut arena = Vec::with_capacity(width * height);

    for y in 0..height {
        for x in 0..width {
            arena.push(SearchNode {
                elev: window.data()[[y, x]],
                dist: f64::INFINITY,
                prev: None,
                visited: false,
                neighbours: neighbour_indices(x, y, width, height),
            });
        }
    }

    arena
}

/// Arena indices of the up-to-8 neighbours of cell (x, y)
fn neighbour_indices(x: usize, y: usize, width: usize, height: usize) -> Vec<u32> {
    let mut neighbours = Vec::with_capacity(8);

    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }

            let nx = x as i64 + dx;
            let ny = y as i64 + dy;

            if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                neighbours.push((ny as usize * width + nx as usize) as u32);
            }
        }
    }

    neighbours
}

/// True if the two arena indices are diagonal neighbours
fn is_diagonal(a: u32, b: u32, width: usize) -> bool {
    let (ax, ay) = (a as usize % width, a as usize / width);
    let (bx, by) = (b as usize % width, b as usize / width);

    ax != bx && ay != by
}

/// Walk the predecessor chain from the goal and return the path in
/// start-to-goal order
fn reconstruct(arena: &[SearchNode], goal: u32, width: usize) -> Vec<Point2<usize>> {
    let mut path = Vec::new();
    let mut current = goal;

    loop {
        let index = current as usize;
        path.push(Point2::new(index % width, index / width));

        match arena[index].prev {
            Some(prev) => current = prev,
            None => break,
        }
    }

    path.reverse();
    path
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
