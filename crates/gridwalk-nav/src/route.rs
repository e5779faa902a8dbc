//! Turns the searcher's step-count gradient into a route, then shortens it.
//!
//! A raw route lists every cell from start to goal. [`straighten`] splices in
//! line-of-sight shortcuts wherever they save steps, and [`to_waypoints`]
//! drops every cell that [`straight_line`] can recover from its neighbours in
//! the list.

use tracing::debug;

use crate::grid::Grid;
use crate::map::{GridPoint, ViabilityMap};

/// Rebuilds the searcher's chain by walking `steps_to_goal` down from `start`.
///
/// Each step moves to the visited neighbour whose count is exactly one lower.
/// Only the goal is accepted at zero: dead-end cells also read zero but were
/// never part of the chain.
///
/// # Returns
/// * `Option<Vec<GridPoint>>` - The raw route, or `None` if the search never reached `start`'s chain.
pub fn reconstruct(grid: &Grid, start: GridPoint, goal: GridPoint) -> Option<Vec<GridPoint>> {
    if start == goal {
        return Some(vec![start]);
    }

    let mut steps = grid.cell(start)?.steps_to_goal;
    if steps == 0 {
        return None;
    }

    let mut route = Vec::with_capacity(steps as usize + 1);
    route.push(start);
    let mut current = start;
    while current != goal {
        let wanted = steps.checked_sub(1)?;
        let next = grid.neighbors_of(current).into_iter().find(|&n| {
            grid.cell(n).is_some_and(|cell| {
                cell.visited && cell.steps_to_goal == wanted && (wanted > 0 || n == goal)
            })
        })?;
        route.push(next);
        current = next;
        steps = wanted;
    }
    Some(route)
}

/// Walks from `from` toward `to`, always stepping to the viable neighbour
/// closest to `to` among those strictly closer than the current cell.
///
/// The walk may bend around obstacles. Every step strictly shrinks the
/// remaining distance, so it always ends.
///
/// # Returns
/// * `Option<Vec<GridPoint>>` - `[from, .., to]` if the walk arrives, `None` if it gets stuck.
pub fn line_of_sight(map: &ViabilityMap, from: GridPoint, to: GridPoint) -> Option<Vec<GridPoint>> {
    walk(map, from, to, true)
}

/// Like [`line_of_sight`], but never bends: each step must land on the
/// neighbour an open grid would choose, and that cell must be viable.
///
/// This is the discrete straight line between two cells.
pub fn straight_line(map: &ViabilityMap, from: GridPoint, to: GridPoint) -> Option<Vec<GridPoint>> {
    walk(map, from, to, false)
}

fn walk(map: &ViabilityMap, from: GridPoint, to: GridPoint, bend: bool) -> Option<Vec<GridPoint>> {
    let mut cells = vec![from];
    let mut current = from;
    while current != to {
        let here = current.distance(&to);
        let (next, _) = map
            .neighbors_of(current)
            .into_iter()
            .filter(|&n| !bend || map.is_viable(n))
            .map(|n| (n, n.distance(&to)))
            .filter(|&(_, d)| d < here)
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        if !map.is_viable(next) {
            return None;
        }
        cells.push(next);
        current = next;
    }
    Some(cells)
}

/// Replaces stretches of `route` with shorter line-of-sight walks.
///
/// For each anchor, the farthest later cell is tried first. A walk that takes
/// fewer steps than the stretch it replaces is spliced in, and the anchor
/// jumps to the end of the splice. Passes repeat until nothing changes, so
/// straightening a straightened route is a no-op.
pub fn straighten(map: &ViabilityMap, route: &[GridPoint]) -> Vec<GridPoint> {
    let mut route = route.to_vec();
    while straighten_pass(map, &mut route) {}
    route
}

/// One sweep over the route. Returns true if anything was spliced.
fn straighten_pass(map: &ViabilityMap, route: &mut Vec<GridPoint>) -> bool {
    let mut changed = false;
    let mut i = 0;
    while i + 1 < route.len() {
        let mut j = route.len() - 1;
        while j > i + 1 {
            let shortcut = line_of_sight(map, route[i], route[j]).filter(|s| s.len() - 1 < j - i);
            match shortcut {
                Some(shortcut) => {
                    debug!(
                        from = %route[i],
                        to = %route[j],
                        saved = (j - i) - (shortcut.len() - 1),
                        "Splicing shortcut"
                    );
                    let end = i + shortcut.len() - 1;
                    route.splice(i..=j, shortcut);
                    changed = true;
                    i = end;
                    j = route.len() - 1;
                }
                None => j -= 1,
            }
        }
        i += 1;
    }
    changed
}

/// Keeps only the cells needed to recover `route` with [`straight_line`].
///
/// From each kept cell the farthest later cell whose straight line retraces
/// the route exactly is kept next. Consecutive waypoints therefore always have
/// a clear straight line between them, and [`expand_waypoints`] gives the
/// route back.
pub fn to_waypoints(map: &ViabilityMap, route: &[GridPoint]) -> Vec<GridPoint> {
    let Some(&first) = route.first() else {
        return Vec::new();
    };

    let mut waypoints = vec![first];
    let mut i = 0;
    while i + 1 < route.len() {
        let next = (i + 2..route.len())
            .rev()
            .find(|&j| {
                straight_line(map, route[i], route[j]).is_some_and(|line| line == route[i..=j])
            })
            .unwrap_or(i + 1);
        waypoints.push(route[next]);
        i = next;
    }
    waypoints
}

/// Concatenates the straight lines between consecutive waypoints.
///
/// # Returns
/// * `Option<Vec<GridPoint>>` - Every cell passed through, or `None` if some pair has no clear line.
pub fn expand_waypoints(map: &ViabilityMap, waypoints: &[GridPoint]) -> Option<Vec<GridPoint>> {
    let mut cells: Vec<GridPoint> = waypoints.first().copied().into_iter().collect();
    for pair in waypoints.windows(2) {
        let line = straight_line(map, pair[0], pair[1])?;
        cells.extend(line.into_iter().skip(1));
    }
    Some(cells)
}
