//! Route search over boolean grids.
//!
//! A [`Grid`] wraps an immutable [`ViabilityMap`] (`true` = walkable) and
//! answers [`Grid::find_path`] queries. The search is a greedy depth-first
//! backtracking search ordered by straight-line distance to the goal. It finds
//! *a* walkable route, not necessarily the shortest one. The route is then
//! straightened with line-of-sight shortcuts and collapsed into waypoints.
//!
//! ```
//! use gridwalk_nav::{Coordinate, Grid};
//!
//! let mut grid = Grid::new(&vec![vec![true; 5]; 5]).unwrap();
//! let path = grid
//!     .find_path(Coordinate::new(0.0, 0.0), Coordinate::new(4.0, 4.0))
//!     .unwrap();
//! assert_eq!(path, Some(vec![Coordinate::new(0.0, 0.0), Coordinate::new(4.0, 4.0)]));
//! ```

pub mod error;
pub mod grid;
pub mod map;
pub mod route;
pub mod search;

pub use error::PathError;
pub use grid::{Grid, PathResult, SearchCell};
pub use map::{Coordinate, GridPoint, ViabilityMap};
