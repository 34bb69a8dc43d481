//! Non-fatal data-quality events raised while decoding.

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Samples with out-of-range geolocation were masked.
    InvalidCoordinates,
    /// No frequency labels are known for the sensor scan mode.
    MissingFrequencies,
}

/// A recoverable event surfaced to the caller with the decoded granule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeWarning {
    pub kind: WarningKind,
    pub message: String,
    /// Number of samples affected, when meaningful.
    pub affected: usize,
}

/// Collects warnings for one granule; every warning is also logged.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<DecodeWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: WarningKind, affected: usize, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = ?kind, affected = affected, "{}", message);
        self.warnings.push(DecodeWarning {
            kind,
            message,
            affected,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodeWarning> {
        self.warnings.iter()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_vec(self) -> Vec<DecodeWarning> {
        self.warnings
    }
}
