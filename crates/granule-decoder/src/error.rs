//! Error types for granule decoding.

use granule_model::GranuleError;
use product_catalog::CatalogError;
use thiserror::Error;

/// Error type returned by a CF decoding primitive.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort the decoding of a granule.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Geolocation outside valid ranges while strict validation was requested.
    #[error(
        "Invalid coordinates in the granule: {invalid_samples} samples outside lon [-180, 180] / lat [-90, 90]"
    )]
    GranuleGeolocation { invalid_samples: usize },

    /// A synthesized coordinate disagrees with the data shape.
    #[error(
        "Coordinate '{coordinate}' has {actual} values but dimension '{dimension}' has size {expected}"
    )]
    CoordinateLengthMismatch {
        coordinate: String,
        dimension: String,
        expected: usize,
        actual: usize,
    },

    #[error("No decoding function registered for variable '{variable}'")]
    UnknownDecoder { variable: String },

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Scan mode '{scan_mode}' is not available for product {product}")]
    UnknownScanMode { product: String, scan_mode: String },

    #[error("Invalid granule: {0}")]
    Granule(GranuleError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("CF decoding failed: {0}")]
    CfDecode(#[source] BoxError),

    #[error("Variable '{variable}': {source}")]
    Variable {
        variable: String,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("Failed to decode {product} {scan_mode} granule: {source}")]
    Context {
        product: String,
        scan_mode: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// The underlying error, with product / scan mode / variable context removed.
    pub fn root(&self) -> &DecodeError {
        match self {
            DecodeError::Context { source, .. } | DecodeError::Variable { source, .. } => {
                source.root()
            }
            other => other,
        }
    }

    pub(crate) fn for_variable(variable: &str, source: DecodeError) -> Self {
        match source {
            // Already names the variable.
            DecodeError::UnknownDecoder { .. } => source,
            _ => DecodeError::Variable {
                variable: variable.to_string(),
                source: Box::new(source),
            },
        }
    }
}

impl From<GranuleError> for DecodeError {
    fn from(err: GranuleError) -> Self {
        match err {
            GranuleError::CoordinateLengthMismatch {
                coordinate,
                dimension,
                expected,
                actual,
            } => DecodeError::CoordinateLengthMismatch {
                coordinate,
                dimension,
                expected,
                actual,
            },
            other => DecodeError::Granule(other),
        }
    }
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_is_promoted() {
        let err: DecodeError = GranuleError::CoordinateLengthMismatch {
            coordinate: "range".into(),
            dimension: "range".into(),
            expected: 130,
            actual: 88,
        }
        .into();
        assert!(matches!(err, DecodeError::CoordinateLengthMismatch { expected: 130, .. }));

        let err: DecodeError = GranuleError::MissingVariable("lat".into()).into();
        assert!(matches!(err, DecodeError::Granule(_)));
    }

    #[test]
    fn test_root_strips_context() {
        let err = DecodeError::Context {
            product: "2A-DPR".into(),
            scan_mode: "FS".into(),
            source: Box::new(DecodeError::for_variable(
                "zFactorFinal",
                DecodeError::Granule(GranuleError::MissingDimension("range".into())),
            )),
        };
        assert!(matches!(err.root(), DecodeError::Granule(_)));
        let msg = err.to_string();
        assert!(msg.contains("2A-DPR") && msg.contains("FS"));
    }
}
