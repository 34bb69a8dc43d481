//! The product catalog: one immutable descriptor per product identifier.

use crate::descriptor::{ProductCategory, ProductDescriptor};
use crate::error::{CatalogError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Criteria for [`ProductCatalog::subset`]. Empty lists do not filter.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub sensors: Vec<String>,
    pub satellites: Vec<String>,
    pub categories: Vec<String>,
    pub product_types: Vec<String>,
    pub versions: Vec<u8>,
    pub full_levels: Vec<String>,
    pub levels: Vec<String>,
}

/// Registry of product descriptors keyed by product identifier.
///
/// Built once from YAML and read-only afterwards, so a single instance can be
/// shared by any number of concurrent decoders.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: BTreeMap<String, ProductDescriptor>,
}

impl ProductCatalog {
    /// Parse and validate a catalog from YAML text.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self> {
        let mut products: BTreeMap<String, ProductDescriptor> =
            serde_yaml::from_str(yaml).map_err(|source| CatalogError::Yaml {
                origin: origin.to_string(),
                source,
            })?;

        for (id, descriptor) in products.iter_mut() {
            descriptor.id = id.clone();
            if let Some(message) = descriptor.problems() {
                return Err(CatalogError::InvalidEntry {
                    entry: id.clone(),
                    message,
                });
            }
        }

        debug!(origin = %origin, products = products.len(), "Built product catalog");
        Ok(Self { products })
    }

    /// Load a catalog from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents, &path.display().to_string())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, product: &str) -> Option<&ProductDescriptor> {
        self.products.get(product)
    }

    /// Descriptor of a product, failing on unknown identifiers.
    pub fn product_info(&self, product: &str) -> Result<&ProductDescriptor> {
        self.get(product)
            .ok_or_else(|| CatalogError::UnknownProduct(product.to_string()))
    }

    pub fn product_category(&self, product: &str) -> Result<ProductCategory> {
        Ok(self.product_info(product)?.category)
    }

    /// Full (`1C-R`) or short (`1C`) product level.
    pub fn product_level(&self, product: &str, full: bool) -> Result<&str> {
        Ok(self.product_info(product)?.level(full))
    }

    /// Scan modes available for one version of a product.
    pub fn scan_modes(&self, product: &str, version: u8) -> Result<&[String]> {
        self.product_info(product)?
            .scan_modes_for(version)
            .ok_or_else(|| CatalogError::InvalidFilter {
                field: "version",
                value: format!("{} (product {})", version, product),
            })
    }

    pub fn is_gpm_product(&self, product: &str) -> bool {
        self.get(product).map_or(false, ProductDescriptor::is_gpm)
    }

    pub fn is_trmm_product(&self, product: &str) -> bool {
        self.get(product).map_or(false, ProductDescriptor::is_trmm)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ProductDescriptor> {
        self.products.values()
    }

    pub fn available_products(&self) -> Vec<&str> {
        self.products.keys().map(String::as_str).collect()
    }

    pub fn available_product_categories(&self) -> Vec<String> {
        self.collect(|d| d.category.to_string())
    }

    pub fn available_product_levels(&self, full: bool) -> Vec<String> {
        self.collect(|d| d.level(full).to_string())
    }

    pub fn available_versions(&self) -> Vec<u8> {
        let versions: BTreeSet<u8> = self.descriptors().flat_map(|d| d.available_versions()).collect();
        versions.into_iter().collect()
    }

    pub fn available_product_types(&self) -> Vec<String> {
        let types: BTreeSet<String> = self
            .descriptors()
            .flat_map(|d| d.product_types.iter().map(|t| t.as_str().to_string()))
            .collect();
        types.into_iter().collect()
    }

    /// Sensor names, optionally as `SENSOR-SATELLITE` (e.g. `SSMIS-F18`).
    pub fn available_sensors(&self, suffix_with_satellite: bool) -> Vec<String> {
        self.collect(|d| {
            if suffix_with_satellite {
                format!("{}-{}", d.sensor, d.satellite)
            } else {
                d.sensor.clone()
            }
        })
    }

    /// Satellite names, optionally as `SENSOR-SATELLITE`.
    pub fn available_satellites(&self, prefix_with_sensor: bool) -> Vec<String> {
        self.collect(|d| {
            if prefix_with_sensor {
                format!("{}-{}", d.sensor, d.satellite)
            } else {
                d.satellite.clone()
            }
        })
    }

    fn collect(&self, key: impl Fn(&ProductDescriptor) -> String) -> Vec<String> {
        let values: BTreeSet<String> = self.descriptors().map(key).collect();
        values.into_iter().collect()
    }

    /// Products matching every non-empty criterion of `filter`.
    ///
    /// A criterion value that no product carries is rejected rather than
    /// silently yielding an empty subset.
    pub fn subset(&self, filter: &CatalogFilter) -> Result<Vec<&ProductDescriptor>> {
        check_filter("sensor", &filter.sensors, &self.available_sensors(false))?;
        check_filter("satellite", &filter.satellites, &self.available_satellites(false))?;
        check_filter("category", &filter.categories, &self.available_product_categories())?;
        check_filter("product type", &filter.product_types, &self.available_product_types())?;
        check_filter("full level", &filter.full_levels, &self.available_product_levels(true))?;
        check_filter("level", &filter.levels, &self.available_product_levels(false))?;
        let versions = self.available_versions();
        if let Some(v) = filter.versions.iter().find(|v| !versions.contains(v)) {
            return Err(CatalogError::InvalidFilter {
                field: "version",
                value: v.to_string(),
            });
        }

        let keep = |values: &[String], value: &str| values.is_empty() || values.iter().any(|v| v == value);

        Ok(self
            .descriptors()
            .filter(|d| keep(&filter.sensors, &d.sensor))
            .filter(|d| keep(&filter.satellites, &d.satellite))
            .filter(|d| keep(&filter.categories, d.category.as_str()))
            .filter(|d| {
                filter.product_types.is_empty()
                    || d.product_types
                        .iter()
                        .any(|t| filter.product_types.iter().any(|f| f == t.as_str()))
            })
            .filter(|d| keep(&filter.full_levels, d.full_level()))
            .filter(|d| keep(&filter.levels, d.short_level()))
            .filter(|d| {
                filter.versions.is_empty()
                    || d.available_versions().any(|v| filter.versions.contains(&v))
            })
            .collect())
    }
}

fn check_filter(field: &'static str, requested: &[String], available: &[String]) -> Result<()> {
    match requested.iter().find(|r| !available.contains(r)) {
        Some(value) => Err(CatalogError::InvalidFilter {
            field,
            value: value.clone(),
        }),
        None => Ok(()),
    }
}
