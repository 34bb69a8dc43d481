//! Labeled multidimensional container for satellite granules.
//!
//! A [`Granule`] holds coordinates and data variables keyed by name, each a
//! [`Variable`] with named dimensions, an `ndarray` array of values, attributes
//! and an on-disk [`Encoding`] record. Decoded numeric data uses NaN for missing
//! values.

pub mod array;
pub mod attrs;
pub mod error;
pub mod granule;
pub mod mask;
pub mod variable;

pub use array::ArrayData;
pub use attrs::{AttrValue, Attributes, Encoding};
pub use error::{GranuleError, GranuleResult};
pub use granule::Granule;
pub use mask::Mask;
pub use variable::Variable;
