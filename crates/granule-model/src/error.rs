//! Error types for granule container operations.

use thiserror::Error;

/// Result type alias using GranuleError.
pub type GranuleResult<T> = Result<T, GranuleError>;

/// Errors raised while building or reshaping a granule.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GranuleError {
    #[error("Variable '{variable}' has {dims} dimension names but {shape} axes")]
    RankMismatch {
        variable: String,
        dims: usize,
        shape: usize,
    },

    #[error("Cannot arrange {values} values into shape {shape:?}")]
    InvalidShape { shape: Vec<usize>, values: usize },

    #[error("Variable '{variable}' repeats dimension '{dimension}'")]
    DuplicateDimension { variable: String, dimension: String },

    #[error(
        "Dimension '{dimension}' has size {existing} in the granule but {found} in variable '{variable}'"
    )]
    DimensionSizeConflict {
        dimension: String,
        variable: String,
        existing: usize,
        found: usize,
    },

    #[error("Coordinate '{coordinate}' has {actual} values but dimension '{dimension}' has size {expected}")]
    CoordinateLengthMismatch {
        coordinate: String,
        dimension: String,
        expected: usize,
        actual: usize,
    },

    #[error("Variable not found: {0}")]
    MissingVariable(String),

    #[error("Dimension not found: {0}")]
    MissingDimension(String),

    #[error("Dimension '{0}' already exists")]
    DimensionExists(String),

    #[error("Index {index} is out of bounds for dimension '{dimension}' of size {size}")]
    IndexOutOfBounds {
        dimension: String,
        index: usize,
        size: usize,
    },

    #[error("Variable '{0}' does not hold numeric data")]
    NotNumeric(String),

    #[error("Variables '{left}' and '{right}' are not aligned")]
    NotAligned { left: String, right: String },
}
