//! Map-related functionality for route search.
//!
//! This module provides the static traversability map and the point types
//! used to address its cells.

pub mod point_types;
pub mod viability;

pub use point_types::{Coordinate, GridPoint};
pub use viability::ViabilityMap;
