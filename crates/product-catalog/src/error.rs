//! Error types for the product catalog.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying the catalog tables.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid catalog entry '{entry}': {message}")]
    InvalidEntry { entry: String, message: String },

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Invalid {field} filter value '{value}'")]
    InvalidFilter { field: &'static str, value: String },
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
