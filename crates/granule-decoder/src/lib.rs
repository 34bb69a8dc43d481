//! Product-aware decoding of GPM / TRMM granules.
//!
//! A raw granule, as read from an HDF5 product file, goes through these stages:
//!
//! 1. CF decoding through a pluggable [`CfDecode`] primitive, followed by
//!    removal of decode bookkeeping (`source_dtype`, `_FillValue`, filter encodings).
//! 2. Attribute normalization (`CodeMissingValue` → `_FillValue`, `Units` → `units`).
//! 3. Geolocation validation for swath granules, masking or failing.
//! 4. Coordinate synthesis from the product catalog (range bins, frequency
//!    labels, height grids).
//! 5. Registered per-variable decoders (e.g. PMW 2A `surfacePrecipitation`).
//! 6. Derived-variable fixups.
//!
//! # Example
//!
//! ```ignore
//! use granule_decoder::{decode, DecodeOptions, GranuleDecoder};
//!
//! let decoded = decode(raw, "2A-DPR", "FS", false)?;
//! for warning in decoded.warnings() {
//!     eprintln!("{}", warning.message);
//! }
//! ```

pub mod attrs;
pub mod cf;
pub mod coords;
pub mod error;
pub mod fixups;
pub mod pipeline;
pub mod registry;
pub mod validation;
pub mod warning;

pub use cf::{CfDecode, PassthroughCf};
pub use coords::{CoordinateRule, SynthesisContext, COORDINATE_RULES};
pub use error::{BoxError, DecodeError, Result};
pub use pipeline::{decode, DecodeOptions, DecodedGranule, GranuleDecoder};
pub use registry::{VariableDecodeFn, VariableDecoderRegistry};
pub use warning::{DecodeWarning, Diagnostics, WarningKind};
