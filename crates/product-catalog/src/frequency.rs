//! Passive microwave channel labels per sensor and scan mode.

use crate::error::{CatalogError, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Immutable `{sensor -> {scan_mode -> [frequency label]}}` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PmwFrequencyTable {
    sensors: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl PmwFrequencyTable {
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self> {
        let sensors: BTreeMap<String, BTreeMap<String, Vec<String>>> = serde_yaml::from_str(yaml)
            .map_err(|source| CatalogError::Yaml {
                origin: origin.to_string(),
                source,
            })?;

        for (sensor, modes) in &sensors {
            for (mode, labels) in modes {
                let entry = format!("{}/{}", sensor, mode);
                if labels.is_empty() {
                    return Err(CatalogError::InvalidEntry {
                        entry,
                        message: "no frequencies listed".to_string(),
                    });
                }
                let unique: HashSet<&String> = labels.iter().collect();
                if unique.len() != labels.len() {
                    return Err(CatalogError::InvalidEntry {
                        entry,
                        message: "duplicate frequency labels".to_string(),
                    });
                }
            }
        }

        debug!(origin = %origin, sensors = sensors.len(), "Built PMW frequency table");
        Ok(Self { sensors })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents, &path.display().to_string())
    }

    /// Ordered frequency labels of a sensor scan mode.
    pub fn frequencies(&self, sensor: &str, scan_mode: &str) -> Option<&[String]> {
        self.sensors
            .get(sensor)
            .and_then(|modes| modes.get(scan_mode))
            .map(Vec::as_slice)
    }

    pub fn sensors(&self) -> impl Iterator<Item = &str> {
        self.sensors.keys().map(String::as_str)
    }

    pub fn scan_modes(&self, sensor: &str) -> impl Iterator<Item = &str> {
        self.sensors
            .get(sensor)
            .into_iter()
            .flat_map(|modes| modes.keys().map(String::as_str))
    }
}
