/*

Heuristic-ordered backtracking search.

    explore(current):
        options = neighbors of current that are viable and not visited
        if goal in options:
            mark goal visited, current.steps = 1
            return [current, goal]
        for next in options, ascending by distance to goal:
            if next was visited meanwhile, skip it
            mark next visited
            if explore(next) returns a chain:
                current.steps = next.steps + 1
                return [current] + chain
        return nothing

The recursion is unrolled into an explicit stack of frames, one per cell on
the current branch, so depth is bounded by the heap rather than the call stack.

*/

use tracing::trace;

use crate::grid::Grid;
use crate::map::GridPoint;

/// What the searcher left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// The discovered chain from start to goal, both included.
    pub chain: Option<Vec<GridPoint>>,
    /// The number of cells marked visited.
    pub cells_visited: usize,
}

/// One level of the unrolled recursion.
struct Frame {
    cell: GridPoint,
    options: std::vec::IntoIter<GridPoint>,
}

enum Expansion {
    /// The goal is adjacent and has been claimed.
    Goal,
    /// Candidates to descend into, best first.
    Options(Vec<GridPoint>),
}

/// Collects the viable, unvisited neighbors of `current`, claiming the goal if it is one of them.
fn expand(grid: &mut Grid, current: GridPoint, goal: GridPoint) -> Expansion {
    let mut options: Vec<(GridPoint, f64)> = grid
        .neighbors_of(current)
        .into_iter()
        .filter_map(|n| grid.cell(n).map(|cell| (n, cell)))
        .filter(|(_, cell)| cell.viable && !cell.visited)
        .map(|(n, cell)| (n, cell.heuristic_distance))
        .collect();

    if options.iter().any(|&(n, _)| n == goal) {
        if let Some(cell) = grid.cell_mut(goal) {
            cell.visited = true;
        }
        return Expansion::Goal;
    }

    // Stable sort: equal distances keep neighbor enumeration order.
    options.sort_by(|a, b| a.1.total_cmp(&b.1));
    Expansion::Options(options.into_iter().map(|(n, _)| n).collect())
}

/// Searches from `start` toward `goal`, marking visited cells and recording
/// `steps_to_goal` along the successful chain.
///
/// `grid` must have been rebuilt for `goal`. The start cell is marked visited
/// before exploration so that no branch can walk back into it.
///
/// # Returns
/// * `SearchOutcome` - The chain `[start, .., goal]` if one was found, and the visit count.
pub fn find_route(grid: &mut Grid, start: GridPoint, goal: GridPoint) -> SearchOutcome {
    if start == goal {
        return SearchOutcome {
            chain: Some(vec![start]),
            cells_visited: 0,
        };
    }

    let mut cells_visited = 0;
    if let Some(cell) = grid.cell_mut(start) {
        cell.visited = true;
        cells_visited += 1;
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut next = start;
    loop {
        match expand(grid, next, goal) {
            Expansion::Goal => {
                cells_visited += 1;
                let mut chain: Vec<GridPoint> = stack.iter().map(|frame| frame.cell).collect();
                chain.push(next);
                record_steps(grid, &chain);
                chain.push(goal);
                return SearchOutcome {
                    chain: Some(chain),
                    cells_visited,
                };
            }
            Expansion::Options(options) => {
                trace!(cell = %next, depth = stack.len(), options = options.len(), "Descending");
                stack.push(Frame {
                    cell: next,
                    options: options.into_iter(),
                });
            }
        }

        // Pick the next candidate, backing out of exhausted frames.
        next = loop {
            let Some(frame) = stack.last_mut() else {
                return SearchOutcome {
                    chain: None,
                    cells_visited,
                };
            };
            match frame.options.next() {
                Some(candidate) => {
                    let Some(cell) = grid.cell_mut(candidate) else {
                        continue;
                    };
                    if cell.visited {
                        continue;
                    }
                    cell.visited = true;
                    cells_visited += 1;
                    break candidate;
                }
                None => {
                    stack.pop();
                }
            }
        };
    }
}

/// Writes hop counts along `chain`, whose last cell sits right next to the goal.
fn record_steps(grid: &mut Grid, chain: &[GridPoint]) {
    for (steps, &p) in (1u32..).zip(chain.iter().rev()) {
        if let Some(cell) = grid.cell_mut(p) {
            cell.steps_to_goal = steps;
        }
    }
}
