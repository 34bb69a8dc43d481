//! Decoder configuration: where the product tables come from.

use std::path::Path;

use anyhow::{Context, Result};
use product_catalog::{PmwFrequencyTable, ProductCatalog};
use tracing::info;

/// Product catalog and frequency table loaded for this run.
#[derive(Debug)]
pub struct Tables {
    pub catalog: ProductCatalog,
    pub frequencies: PmwFrequencyTable,
}

impl Tables {
    /// Load both tables from `dir`, or from `CONFIG_DIR` / `config/` when not
    /// given. Tables missing on disk fall back to the built-in copies.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let config_dir = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(product_catalog::config_dir);

        let catalog = ProductCatalog::load_from_dir(&config_dir)
            .with_context(|| format!("Failed to load product catalog from {}", config_dir.display()))?;
        let frequencies = PmwFrequencyTable::load_from_dir(&config_dir).with_context(|| {
            format!("Failed to load PMW frequency table from {}", config_dir.display())
        })?;

        info!(
            config_dir = ?config_dir,
            products = catalog.len(),
            sensors = frequencies.sensors().count(),
            "Loaded product tables"
        );

        Ok(Self {
            catalog,
            frequencies,
        })
    }
}
