use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::PathError;
use crate::map::{Coordinate, GridPoint, ViabilityMap};
use crate::{route, search};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mark used for route cells in [`Grid::render`].
pub const ROUTE_CHAR: char = '#';

/// Per-search state attached to one grid cell.
///
/// A fresh set of cells is built by [`Grid::rebuild`] at the start of every search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCell {
    /// The cell this state belongs to.
    pub position: GridPoint,
    /// Copied from the viability map; true if the cell may be stepped on.
    pub viable: bool,
    /// Set once the searcher has explored or queued this cell. Never reset within a search.
    pub visited: bool,
    /// Euclidean distance from this cell to the goal of the current search.
    pub heuristic_distance: f64,
    /// Hops from this cell to the goal along the discovered route. 0 for the goal and for unset cells.
    pub steps_to_goal: u32,
}

/// Represents the result of a route search with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathResult {
    /// The straightened waypoints, if a route was found.
    pub path: Option<Vec<Coordinate>>,
    /// Number of cells in the raw route before straightening.
    pub raw_length: Option<usize>,
    /// The number of cells the search marked visited.
    pub cells_visited: usize,
    /// The number of waypoints in `path`.
    pub path_length: usize,
}

impl PathResult {
    /// Creates a new PathResult for a successful search.
    pub fn success(path: Vec<Coordinate>, raw_length: usize, cells_visited: usize) -> Self {
        let path_length = path.len();
        Self {
            path: Some(path),
            raw_length: Some(raw_length),
            cells_visited,
            path_length,
        }
    }

    /// Creates a new PathResult for a search that found no route.
    pub fn failure(cells_visited: usize) -> Self {
        Self {
            path: None,
            raw_length: None,
            cells_visited,
            path_length: 0,
        }
    }

    /// Returns true if a route was found.
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the route if one was found.
    pub fn into_path(self) -> Option<Vec<Coordinate>> {
        self.path
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(_) => write!(
                f,
                "PathResult {{ success: true, path_length: {}, raw_length: {}, cells_visited: {} }}",
                self.path_length,
                self.raw_length.unwrap_or(0),
                self.cells_visited
            ),
            None => write!(
                f,
                "PathResult {{ success: false, cells_visited: {} }}",
                self.cells_visited
            ),
        }
    }
}

/// A route-search session over a shared, immutable [`ViabilityMap`].
///
/// The grid owns the per-search cell state, so searches need `&mut self`.
/// Callers that search concurrently give each thread its own `Grid` built with
/// [`Grid::with_map`] over one `Arc<ViabilityMap>`.
#[derive(Debug, Clone)]
pub struct Grid {
    map: Arc<ViabilityMap>,
    cells: Vec<SearchCell>,
}

impl Grid {
    /// Creates a grid from a rectangular boolean map indexed `viability[x][y]`.
    ///
    /// # Arguments
    /// * `viability` - Columns of the map, `true` marking traversable cells
    ///
    /// # Returns
    /// * `Result<Self, PathError>` - `InvalidDimensions` if the map is empty or not rectangular
    pub fn new(viability: &[Vec<bool>]) -> Result<Self, PathError> {
        Ok(Self::with_map(Arc::new(ViabilityMap::from_columns(viability)?)))
    }

    /// Creates a grid sized to hold every listed coordinate, with only those cells viable.
    pub fn from_valid_cells(valid_cells: &[Coordinate]) -> Result<Self, PathError> {
        Ok(Self::with_map(Arc::new(ViabilityMap::from_valid_cells(valid_cells)?)))
    }

    /// Creates a new search session over a shared map.
    pub fn with_map(map: Arc<ViabilityMap>) -> Self {
        Self {
            map,
            cells: Vec::new(),
        }
    }

    /// The static map this session searches.
    pub fn map(&self) -> &Arc<ViabilityMap> {
        &self.map
    }

    /// Discards all search state and rebuilds it for a search toward `goal`.
    pub fn rebuild(&mut self, goal: GridPoint) {
        let (width, height) = (self.map.width(), self.map.height());
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let position = GridPoint::new(x, y);
                cells.push(SearchCell {
                    position,
                    viable: self.map.is_viable(position),
                    visited: false,
                    heuristic_distance: position.distance(&goal),
                    steps_to_goal: 0,
                });
            }
        }
        self.cells = cells;
    }

    /// The search state of `p` from the most recent search, if any.
    pub fn cell(&self, p: GridPoint) -> Option<&SearchCell> {
        if self.map.contains(p) {
            self.cells.get(self.map.get_index(p))
        } else {
            None
        }
    }

    pub(crate) fn cell_mut(&mut self, p: GridPoint) -> Option<&mut SearchCell> {
        if self.map.contains(p) {
            let index = self.map.get_index(p);
            self.cells.get_mut(index)
        } else {
            None
        }
    }

    /// The up-to-8 cells adjacent to `p`, clipped to the grid.
    pub fn neighbors_of(&self, p: GridPoint) -> Vec<GridPoint> {
        self.map.neighbors_of(p)
    }

    /// Finds a route from `start` to `end`.
    ///
    /// # Arguments
    /// * `start` - Starting cell.
    /// * `end` - Goal cell.
    ///
    /// # Returns
    /// * `Ok(Some(waypoints))` - Straightened waypoints, first `start`, last `end`.
    ///   Two coordinates in the same cell give `[start, end]`, or just `[start]` if they are equal.
    /// * `Ok(None)` - No route exists.
    /// * `Err(PathError)` - `start` or `end` is not a cell of this grid.
    ///
    /// The search itself is linear in the cells it visits, but straightening
    /// and waypoint reduction try O(n²) line walks per pass over a raw route of
    /// n cells. Routes thousands of cells long (long serpentine corridors) are
    /// slow to post-process; use [`crate::search::find_route`] directly when
    /// only the raw chain is needed.
    pub fn find_path(
        &mut self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Option<Vec<Coordinate>>, PathError> {
        Ok(self.find_path_detailed(start, end)?.into_path())
    }

    /// Finds a route from `start` to `end`, returning search metadata alongside it.
    pub fn find_path_detailed(
        &mut self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<PathResult, PathError> {
        let start_p = self.map.resolve(start)?;
        let end_p = self.map.resolve(end)?;

        self.rebuild(end_p);
        if !self.map.is_viable(start_p) || !self.map.is_viable(end_p) {
            debug!(%start_p, %end_p, "Endpoint is not viable, no route");
            return Ok(PathResult::failure(0));
        }

        let outcome = search::find_route(self, start_p, end_p);
        debug!(
            %start_p,
            %end_p,
            found = outcome.chain.is_some(),
            cells_visited = outcome.cells_visited,
            "Route search finished"
        );

        let Some(raw) = route::reconstruct(self, start_p, end_p) else {
            return Ok(PathResult::failure(outcome.cells_visited));
        };
        debug_assert_eq!(Some(&raw), outcome.chain.as_ref());

        let straight = route::straighten(&self.map, &raw);
        let waypoints = route::to_waypoints(&self.map, &straight);
        debug!(
            raw_length = raw.len(),
            straightened_length = straight.len(),
            waypoints = waypoints.len(),
            "Route built"
        );

        // Hand back the caller's exact endpoints rather than the truncated cells.
        let path = match waypoints.as_slice() {
            [_] if start == end => vec![start],
            [_] => vec![start, end],
            [_, inner @ .., _] => std::iter::once(start)
                .chain(inner.iter().copied().map(Coordinate::from))
                .chain(std::iter::once(end))
                .collect(),
            [] => return Ok(PathResult::failure(outcome.cells_visited)),
        };
        Ok(PathResult::success(path, raw.len(), outcome.cells_visited))
    }

    /// The line-of-sight walk from `from` to `to`, if one exists.
    ///
    /// # Returns
    /// * `Result<Option<Vec<Coordinate>>, PathError>` - Every cell of the walk, both ends included
    pub fn line_of_sight(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Vec<Coordinate>>, PathError> {
        let from = self.map.resolve(from)?;
        let to = self.map.resolve(to)?;
        Ok(route::line_of_sight(&self.map, from, to).map(to_coordinates))
    }

    /// The discrete straight line from `from` to `to`, if every cell on it is viable.
    pub fn straight_line(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Vec<Coordinate>>, PathError> {
        let from = self.map.resolve(from)?;
        let to = self.map.resolve(to)?;
        Ok(route::straight_line(&self.map, from, to).map(to_coordinates))
    }

    /// Shortens a cell-by-cell route by splicing in line-of-sight shortcuts.
    pub fn straighten(&self, route: &[Coordinate]) -> Result<Vec<Coordinate>, PathError> {
        let cells = self.resolve_all(route)?;
        Ok(to_coordinates(route::straighten(&self.map, &cells)))
    }

    /// Collapses a cell-by-cell route into waypoints joined by straight lines.
    pub fn to_waypoints(&self, route: &[Coordinate]) -> Result<Vec<Coordinate>, PathError> {
        let cells = self.resolve_all(route)?;
        Ok(to_coordinates(route::to_waypoints(&self.map, &cells)))
    }

    /// Expands waypoints back into every cell they pass through.
    ///
    /// Returns `Ok(None)` if some pair of consecutive waypoints has no clear straight line.
    pub fn expand_waypoints(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<Option<Vec<Coordinate>>, PathError> {
        let cells = self.resolve_all(waypoints)?;
        Ok(route::expand_waypoints(&self.map, &cells).map(to_coordinates))
    }

    /// Renders the grid with `route` cells marked, for diagnostics.
    pub fn render(&self, route: &[Coordinate]) -> String {
        let marked: Vec<GridPoint> = route
            .iter()
            .filter_map(|&c| self.map.resolve(c).ok())
            .collect();
        self.map.render(&marked, ROUTE_CHAR)
    }

    fn resolve_all(&self, coordinates: &[Coordinate]) -> Result<Vec<GridPoint>, PathError> {
        coordinates.iter().map(|&c| self.map.resolve(c)).collect()
    }
}

fn to_coordinates(cells: Vec<GridPoint>) -> Vec<Coordinate> {
    cells.into_iter().map(Coordinate::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: usize, height: usize) -> Grid {
        Grid::new(&vec![vec![true; height]; width]).unwrap()
    }

    #[test]
    fn test_grid_construction_errors() {
        assert!(matches!(Grid::new(&[]), Err(PathError::InvalidDimensions(_))));
        assert!(matches!(
            Grid::new(&[vec![true, true], vec![true]]),
            Err(PathError::InvalidDimensions(_))
        ));
        assert!(matches!(
            Grid::from_valid_cells(&[]),
            Err(PathError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_rebuild_resets_state() {
        let mut grid = open_grid(3, 3);
        let corner = GridPoint::new(0, 0);
        let goal = GridPoint::new(2, 2);
        grid.rebuild(goal);

        let cell = grid.cell(corner).unwrap();
        assert!(cell.viable);
        assert!(!cell.visited);
        assert_eq!(cell.steps_to_goal, 0);
        assert!((cell.heuristic_distance - 8f64.sqrt()).abs() < 1e-9);
        assert_eq!(grid.cell(goal).unwrap().heuristic_distance, 0.0);

        let cell = grid.cell_mut(corner).unwrap();
        cell.visited = true;
        cell.steps_to_goal = 4;
        grid.rebuild(goal);
        let cell = grid.cell(corner).unwrap();
        assert!(!cell.visited);
        assert_eq!(cell.steps_to_goal, 0);
    }

    #[test]
    fn test_cell_before_first_search() {
        let grid = open_grid(2, 2);
        assert!(grid.cell(GridPoint::new(0, 0)).is_none());
    }

    #[test]
    fn test_neighbors_clipped_and_ordered() {
        let grid = open_grid(3, 3);
        assert_eq!(
            grid.neighbors_of(GridPoint::new(0, 0)),
            vec![GridPoint::new(0, 1), GridPoint::new(1, 0), GridPoint::new(1, 1)]
        );
        assert_eq!(grid.neighbors_of(GridPoint::new(1, 1)).len(), 8);
        assert!(!grid.neighbors_of(GridPoint::new(1, 1)).contains(&GridPoint::new(1, 1)));
    }

    #[test]
    fn test_find_path_rejects_out_of_bounds() {
        let mut grid = open_grid(3, 3);
        assert!(matches!(
            grid.find_path(Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 0.0)),
            Err(PathError::OutOfBounds(_))
        ));
        assert!(matches!(
            grid.find_path(Coordinate::new(-1.0, 0.0), Coordinate::new(2.0, 0.0)),
            Err(PathError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_find_path_keeps_exact_endpoints() {
        let mut grid = open_grid(5, 5);
        let start = Coordinate::new(0.25, 0.5);
        let end = Coordinate::new(4.75, 4.0);
        let path = grid.find_path(start, end).unwrap().unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
    }

    #[test]
    fn test_same_cell_endpoints_keep_both_coordinates() {
        let mut grid = open_grid(3, 3);
        let start = Coordinate::new(1.2, 0.0);
        let end = Coordinate::new(1.7, 0.0);
        let path = grid.find_path(start, end).unwrap().unwrap();
        assert_eq!(path, vec![start, end]);

        let same = grid.find_path(start, start).unwrap().unwrap();
        assert_eq!(same, vec![start]);
    }

    #[test]
    fn test_non_viable_endpoint_clears_previous_search() {
        let mut grid = Grid::new(&[
            vec![true, true, true],
            vec![true, false, true],
            vec![true, true, true],
        ])
        .unwrap();
        let start = GridPoint::new(0, 0);
        assert!(grid.find_path(start.into(), Coordinate::new(2.0, 2.0)).unwrap().is_some());
        assert!(grid.cell(start).unwrap().visited);

        assert_eq!(grid.find_path(start.into(), Coordinate::new(1.0, 1.0)).unwrap(), None);
        let cell = grid.cell(start).unwrap();
        assert!(!cell.visited);
        assert_eq!(cell.steps_to_goal, 0);
        assert!(grid.cells.iter().all(|cell| !cell.visited));
    }

    #[test]
    fn test_path_result_detailed() {
        let mut grid = Grid::new(&[
            vec![true, true, true],
            vec![false, false, true],
            vec![true, true, true],
        ])
        .unwrap();
        let result = grid
            .find_path_detailed(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 0.0))
            .unwrap();

        assert!(result.is_success(), "Route should be found");
        assert!(result.cells_visited > 0, "Should have visited some cells");
        assert_eq!(result.raw_length, Some(5));
        assert_eq!(result.path_length, result.path.as_ref().unwrap().len());

        let display_str = format!("{}", result);
        assert!(display_str.contains("success: true"));
        assert!(display_str.contains("cells_visited"));

        let mut blocked = Grid::new(&[vec![true], vec![false], vec![true]]).unwrap();
        let blocked_result = blocked
            .find_path_detailed(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 0.0))
            .unwrap();
        assert!(!blocked_result.is_success());
        assert_eq!(blocked_result.path_length, 0);
        assert!(blocked_result.raw_length.is_none());
        assert!(format!("{}", blocked_result).contains("success: false"));
    }

    #[test]
    fn test_render_marks_route() {
        let grid = Grid::new(&[vec![true, true], vec![false, true]]).unwrap();
        let rendered = grid.render(&[Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]);
        assert_eq!(rendered, "#X\nO#\n");
    }
}
