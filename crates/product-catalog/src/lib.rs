//! GPM / TRMM product catalog.
//!
//! Two read-only tables drive product-aware decoding:
//!
//! - [`ProductCatalog`]: category, level, naming pattern, sensor, satellite,
//!   versions and per scan mode physical constants (range bins, height grids)
//!   for every product identifier.
//! - [`PmwFrequencyTable`]: ordered passive microwave channel labels per sensor
//!   and scan mode.
//!
//! Both are plain immutable values. Build them once (or use the lazily built
//! `shared()` instances) and pass them by reference to every decoder.

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod frequency;

pub use catalog::{CatalogFilter, ProductCatalog};
pub use config::config_dir;
pub use descriptor::{
    HeightGrid, ProductCategory, ProductDescriptor, ProductType, RangeBins, ScanModeConstants,
};
pub use error::{CatalogError, Result};
pub use frequency::PmwFrequencyTable;
