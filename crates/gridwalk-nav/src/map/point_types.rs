use crate::error::PathError;

/// Represents a cell in grid coordinates (cell indices).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// The x-coordinate (column index) in the grid.
    pub x: usize,
    /// The y-coordinate (row index) in the grid.
    pub y: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Straight-line distance between the centers of two cells.
    pub fn distance(&self, other: &GridPoint) -> f64 {
        let dx = self.x.abs_diff(other.x) as f64;
        let dy = self.y.abs_diff(other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An X/Y pair identifying a grid cell, as handed in and out of the public API.
///
/// Fractional components are truncated toward zero when a coordinate is
/// resolved to a cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// The x-coordinate.
    pub x: f64,
    /// The y-coordinate.
    pub y: f64,
}

impl Coordinate {
    /// Creates a new `Coordinate`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Resolves this coordinate to a cell index without any bounds check
    /// beyond rejecting negative or non-finite components.
    pub fn to_grid_point(&self) -> Result<GridPoint, PathError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(PathError::InvalidCoordinates("Coordinates must be finite"));
        }
        if self.x < 0.0 || self.y < 0.0 {
            return Err(PathError::InvalidCoordinates("Coordinates must be non-negative"));
        }
        Ok(GridPoint::new(self.x as usize, self.y as usize))
    }
}

impl From<GridPoint> for Coordinate {
    fn from(p: GridPoint) -> Self {
        Coordinate::new(p.x as f64, p.y as f64)
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Coordinate::new(x as f64, y as f64)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
