//! Where the catalog tables come from, and the process-wide shared instances.
//!
//! Tables are read from `$CONFIG_DIR/products.yaml` and
//! `$CONFIG_DIR/pmw_frequency.yaml` (default `config/`). When a file is absent
//! the copy embedded at build time is used instead.

use crate::catalog::ProductCatalog;
use crate::error::Result;
use crate::frequency::PmwFrequencyTable;
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const PRODUCTS_FILE: &str = "products.yaml";
pub const PMW_FREQUENCY_FILE: &str = "pmw_frequency.yaml";

const BUILTIN_PRODUCTS: &str = include_str!("../../../config/products.yaml");
const BUILTIN_PMW_FREQUENCY: &str = include_str!("../../../config/pmw_frequency.yaml");

static SHARED_CATALOG: OnceCell<ProductCatalog> = OnceCell::new();
static SHARED_FREQUENCIES: OnceCell<PmwFrequencyTable> = OnceCell::new();

/// Get the config directory path.
///
/// Checks CONFIG_DIR environment variable first, falls back to "config".
pub fn config_dir() -> PathBuf {
    match env::var("CONFIG_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from("config"),
    }
}

impl ProductCatalog {
    /// The catalog embedded at build time.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_PRODUCTS, "built-in products.yaml")
    }

    /// Load from `dir/products.yaml`, or the built-in catalog if that file is absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(PRODUCTS_FILE);
        if path.exists() {
            info!(path = ?path, "Loading product catalog");
            Self::from_path(&path)
        } else {
            debug!(path = ?path, "Product catalog file not found, using built-in table");
            Self::builtin()
        }
    }

    /// Process-wide catalog, built on first use from [`config_dir`].
    ///
    /// Concurrent first callers block until one build finishes; a failed build
    /// is not cached, so a later call may retry.
    pub fn shared() -> Result<&'static ProductCatalog> {
        SHARED_CATALOG.get_or_try_init(|| Self::load_from_dir(&config_dir()))
    }
}

impl PmwFrequencyTable {
    /// The frequency table embedded at build time.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_PMW_FREQUENCY, "built-in pmw_frequency.yaml")
    }

    /// Load from `dir/pmw_frequency.yaml`, or the built-in table if that file is absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(PMW_FREQUENCY_FILE);
        if path.exists() {
            info!(path = ?path, "Loading PMW frequency table");
            Self::from_path(&path)
        } else {
            debug!(path = ?path, "PMW frequency file not found, using built-in table");
            Self::builtin()
        }
    }

    /// Process-wide frequency table, built on first use from [`config_dir`].
    pub fn shared() -> Result<&'static PmwFrequencyTable> {
        SHARED_FREQUENCIES.get_or_try_init(|| Self::load_from_dir(&config_dir()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_parse() {
        let catalog = ProductCatalog::builtin().unwrap();
        assert!(catalog.len() > 30);
        let table = PmwFrequencyTable::builtin().unwrap();
        assert!(table.frequencies("GMI", "S1").is_some());
    }

    #[test]
    fn test_missing_dir_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ProductCatalog::load_from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), ProductCatalog::builtin().unwrap().len());
    }

    #[test]
    fn test_shared_is_built_once() {
        let a = ProductCatalog::shared().unwrap();
        let b = ProductCatalog::shared().unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
