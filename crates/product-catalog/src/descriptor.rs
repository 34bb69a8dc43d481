//! Product descriptors and per scan mode physical constants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Broad product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductCategory {
    /// Spaceborne precipitation radar (PR, DPR)
    Radar,
    /// Passive microwave radiometers (GMI, TMI, SSMIS, ...)
    Pmw,
    /// Combined radar-radiometer retrievals
    Cmb,
    /// Multi-satellite merged precipitation
    Imerg,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Radar => "RADAR",
            ProductCategory::Pmw => "PMW",
            ProductCategory::Cmb => "CMB",
            ProductCategory::Imerg => "IMERG",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Research (RS) or near-real-time (NRT) processing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductType {
    Rs,
    Nrt,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Rs => "RS",
            ProductType::Nrt => "NRT",
        }
    }
}

/// Evenly spaced range bins, starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBins {
    pub bins: usize,
    /// Bin spacing in meters
    pub spacing: f64,
}

impl RangeBins {
    /// Distance of every bin: `0, spacing, 2 * spacing, ...`
    pub fn distances(&self) -> Vec<f64> {
        (0..self.bins).map(|i| i as f64 * self.spacing).collect()
    }
}

/// Fixed layer-centre heights, linearly spaced from `bottom` to `top` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightGrid {
    pub levels: usize,
    /// Centre of the lowest layer (m)
    pub bottom: f64,
    /// Centre of the highest layer (m)
    pub top: f64,
}

impl HeightGrid {
    pub fn heights(&self) -> Vec<f64> {
        match self.levels {
            0 => Vec::new(),
            1 => vec![self.bottom],
            n => {
                let step = (self.top - self.bottom) / (n - 1) as f64;
                (0..n).map(|i| self.bottom + i as f64 * step).collect()
            }
        }
    }
}

/// Physical constants of one scan mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanModeConstants {
    #[serde(default)]
    pub range: Option<RangeBins>,
    #[serde(default)]
    pub height_grid: Option<HeightGrid>,
}

/// Immutable description of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Product identifier, e.g. `2A-DPR`. Filled in from the catalog key.
    #[serde(skip_deserializing, default)]
    pub id: String,
    pub category: ProductCategory,
    /// Full product level, e.g. `1C-R`, `2A-ENV`, `3B-HHR-E`
    pub level: String,
    /// Source file naming pattern
    pub pattern: String,
    pub sensor: String,
    pub satellite: String,
    #[serde(default)]
    pub product_types: Vec<ProductType>,
    /// Scan modes available for each product version
    pub versions: BTreeMap<u8, Vec<String>>,
    #[serde(default)]
    pub scan_modes: BTreeMap<String, ScanModeConstants>,
}

impl ProductDescriptor {
    /// Short product level: the first two characters of the full level.
    pub fn short_level(&self) -> &str {
        self.level.get(..2).unwrap_or(&self.level)
    }

    pub fn full_level(&self) -> &str {
        &self.level
    }

    pub fn level(&self, full: bool) -> &str {
        if full {
            self.full_level()
        } else {
            self.short_level()
        }
    }

    pub fn available_versions(&self) -> impl Iterator<Item = u8> + '_ {
        self.versions.keys().copied()
    }

    pub fn latest_version(&self) -> Option<u8> {
        self.versions.keys().next_back().copied()
    }

    /// Scan modes of a given version.
    pub fn scan_modes_for(&self, version: u8) -> Option<&[String]> {
        self.versions.get(&version).map(Vec::as_slice)
    }

    /// Whether any version of the product has this scan mode.
    pub fn has_scan_mode(&self, scan_mode: &str) -> bool {
        self.versions.values().any(|modes| modes.iter().any(|m| m == scan_mode))
    }

    /// Physical constants for a scan mode, if the catalog defines any.
    pub fn constants(&self, scan_mode: &str) -> Option<&ScanModeConstants> {
        self.scan_modes.get(scan_mode)
    }

    pub fn is_gpm(&self) -> bool {
        self.satellite == "GPM"
    }

    pub fn is_trmm(&self) -> bool {
        self.satellite == "TRMM"
    }

    /// Check internal consistency; returns a description of the first problem.
    pub(crate) fn problems(&self) -> Option<String> {
        if self.level.len() < 2 {
            return Some(format!("product level '{}' is too short", self.level));
        }
        if self.versions.is_empty() {
            return Some("no versions listed".to_string());
        }
        if let Some((version, _)) = self.versions.iter().find(|(_, modes)| modes.is_empty()) {
            return Some(format!("version {} lists no scan modes", version));
        }
        for (mode, constants) in &self.scan_modes {
            if !self.has_scan_mode(mode) {
                return Some(format!("constants given for unknown scan mode '{}'", mode));
            }
            if let Some(range) = constants.range {
                if range.bins == 0 || !(range.spacing > 0.0) {
                    return Some(format!("scan mode '{}' has an empty range definition", mode));
                }
            }
            if let Some(grid) = constants.height_grid {
                if grid.levels < 2 || !(grid.top > grid.bottom) {
                    return Some(format!("scan mode '{}' has a degenerate height grid", mode));
                }
            }
        }
        None
    }
}
