#![warn(missing_docs)]

use rand::Rng;

use super::{Coordinate, GridPoint};
use crate::error::PathError;

/// Character used for a traversable cell in text renderings.
pub const VIABLE_CHAR: char = 'O';
/// Character used for a blocked cell in text renderings.
pub const BLOCKED_CHAR: char = 'X';

/// An immutable 2D traversability map. `true` cells may be stepped on.
///
/// The map is never mutated after construction, so one map can be shared
/// (behind an `Arc`) between any number of search sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViabilityMap {
    /// Width of the map in cells
    width: usize,
    /// Height of the map in cells
    height: usize,
    /// Row-major viability flags
    data: Vec<bool>,
}

impl ViabilityMap {
    /// Creates a map of the given size with every cell set to `viable`.
    ///
    /// # Arguments
    /// * `width` - Width of the map in cells
    /// * `height` - Height of the map in cells
    /// * `viable` - Initial value of every cell
    ///
    /// # Returns
    /// * `Result<Self, PathError>` - The created map or an error if a dimension is zero
    pub fn new(width: usize, height: usize, viable: bool) -> Result<Self, PathError> {
        if width == 0 || height == 0 {
            return Err(PathError::InvalidDimensions("Width and height must be non-zero"));
        }

        // Check for potential overflow in data allocation
        let Some(len) = width.checked_mul(height) else {
            return Err(PathError::InvalidDimensions("Map dimensions too large, would cause overflow"));
        };

        let mut data = Vec::new();
        if data.try_reserve_exact(len).is_err() {
            return Err(PathError::InvalidDimensions("Map dimensions too large to allocate"));
        }
        data.resize(len, viable);

        Ok(ViabilityMap {
            width,
            height,
            data,
        })
    }

    /// Creates a map from column vectors, indexed `columns[x][y]`.
    ///
    /// # Returns
    /// * `Result<Self, PathError>` - An error if the input is empty or its columns differ in length
    pub fn from_columns(columns: &[Vec<bool>]) -> Result<Self, PathError> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|column| column.len() != height) {
            return Err(PathError::InvalidDimensions("Map must be rectangular"));
        }

        let mut map = ViabilityMap::new(width, height, false)?;
        for (x, column) in columns.iter().enumerate() {
            for (y, &viable) in column.iter().enumerate() {
                let index = map.get_index(GridPoint::new(x, y));
                map.data[index] = viable;
            }
        }
        Ok(map)
    }

    /// Parses a map from text rows, one string per `y`, one char per `x`.
    ///
    /// `.` and `O` are viable. `#` and `X` are blocked. Any other character
    /// is treated as blocked.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, PathError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if rows.iter().any(|row| row.as_ref().chars().count() != width) {
            return Err(PathError::InvalidDimensions("Map must be rectangular"));
        }

        let mut map = ViabilityMap::new(width, height, false)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.as_ref().chars().enumerate() {
                let index = map.get_index(GridPoint::new(x, y));
                map.data[index] = matches!(c, '.' | VIABLE_CHAR);
            }
        }
        Ok(map)
    }

    /// Creates a map just large enough to hold every listed cell, marking
    /// the listed cells viable and everything else blocked.
    pub fn from_valid_cells(cells: &[Coordinate]) -> Result<Self, PathError> {
        if cells.is_empty() {
            return Err(PathError::InvalidDimensions("At least one valid cell is required"));
        }

        let points = cells
            .iter()
            .map(Coordinate::to_grid_point)
            .collect::<Result<Vec<_>, _>>()?;
        let width = points.iter().map(|p| p.x).max().unwrap_or(0).checked_add(1);
        let height = points.iter().map(|p| p.y).max().unwrap_or(0).checked_add(1);
        let (Some(width), Some(height)) = (width, height) else {
            return Err(PathError::InvalidDimensions("Valid cell lies beyond the largest possible map"));
        };

        let mut map = ViabilityMap::new(width, height, false)?;
        for p in points {
            let index = map.get_index(p);
            map.data[index] = true;
        }
        Ok(map)
    }

    /// Creates a map where each cell is independently viable with probability `open_ratio`.
    ///
    /// Pass a seeded rng for reproducible maps.
    pub fn new_rand<R: Rng>(
        width: usize,
        height: usize,
        open_ratio: f64,
        rng: &mut R,
    ) -> Result<Self, PathError> {
        if !(0.0..=1.0).contains(&open_ratio) {
            return Err(PathError::InvalidDimensions("Open ratio must be within [0, 1]"));
        }

        let mut map = ViabilityMap::new(width, height, false)?;
        for viable in map.data.iter_mut() {
            *viable = rng.random_bool(open_ratio);
        }
        Ok(map)
    }

    /// Calculates the index in the data vector for a given grid point
    pub(crate) fn get_index(&self, p: GridPoint) -> usize {
        p.y * self.width + p.x
    }

    /// Width of the map in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the map in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true if `p` lies inside the map.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Gets the viability of a cell.
    ///
    /// # Returns
    /// * `Result<bool, PathError>` - The flag at the specified position or an error if out of bounds
    pub fn get(&self, p: GridPoint) -> Result<bool, PathError> {
        if self.contains(p) {
            Ok(self.data[self.get_index(p)])
        } else {
            Err(PathError::OutOfBounds("Map index out of bounds"))
        }
    }

    /// Returns true if `p` is inside the map and traversable.
    pub fn is_viable(&self, p: GridPoint) -> bool {
        self.get(p).unwrap_or(false)
    }

    /// The up-to-8 cells adjacent to `p`, clipped to the map.
    ///
    /// Cells are listed with `x` ascending in the outer loop and `y` ascending
    /// in the inner loop. Searches rely on this order to break ties.
    pub fn neighbors_of(&self, p: GridPoint) -> Vec<GridPoint> {
        let mut neighbors = Vec::with_capacity(8);
        for x in p.x.saturating_sub(1)..=p.x.saturating_add(1) {
            for y in p.y.saturating_sub(1)..=p.y.saturating_add(1) {
                let n = GridPoint::new(x, y);
                if n != p && self.contains(n) {
                    neighbors.push(n);
                }
            }
        }
        neighbors
    }

    /// Number of traversable cells.
    pub fn viable_count(&self) -> usize {
        self.data.iter().filter(|&&viable| viable).count()
    }

    /// Resolves a public coordinate to an in-bounds cell.
    pub fn resolve(&self, c: Coordinate) -> Result<GridPoint, PathError> {
        let p = c.to_grid_point()?;
        if self.contains(p) {
            Ok(p)
        } else {
            Err(PathError::OutOfBounds("Coordinate outside map bounds"))
        }
    }

    /// Renders the map one text row per `y`, marking the listed cells with `mark`.
    pub fn render(&self, marked: &[GridPoint], mark: char) -> String {
        let mut chars: Vec<char> = self
            .data
            .iter()
            .map(|&viable| if viable { VIABLE_CHAR } else { BLOCKED_CHAR })
            .collect();
        for &p in marked {
            if self.contains(p) {
                chars[self.get_index(p)] = mark;
            }
        }

        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in chars.chunks(self.width) {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for ViabilityMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ViabilityMap ({}x{}, {} viable)", self.width, self.height, self.viable_count())?;
        write!(f, "{}", self.render(&[], VIABLE_CHAR))
    }
}
