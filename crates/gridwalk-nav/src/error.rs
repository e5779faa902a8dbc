//! This module defines the error types used by the `gridwalk-nav` crate.

#![warn(missing_docs)]

/// Error type for grid construction and route queries.
///
/// Every variant describes malformed caller input. A search that simply finds
/// no route is not an error and is reported as `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// Error for invalid map dimensions.
    /// This variant is returned when a map is empty or not rectangular.
    InvalidDimensions(&'static str),
    /// Error for out-of-bounds access.
    /// This variant is returned when a start or end cell lies outside the map.
    OutOfBounds(&'static str),
    /// Error for unusable coordinates.
    /// This variant is returned for negative or non-finite coordinate components.
    InvalidCoordinates(&'static str),
}

impl core::fmt::Display for PathError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathError::InvalidDimensions(msg) => write!(f, "Invalid map dimensions: {}", msg),
            PathError::OutOfBounds(msg) => write!(f, "Map access out of bounds: {}", msg),
            PathError::InvalidCoordinates(msg) => write!(f, "Invalid coordinates: {}", msg),
        }
    }
}

impl core::error::Error for PathError {}
