//! Coordinate synthesis.
//!
//! Every coordinate the pipeline may attach is listed in [`COORDINATE_RULES`]
//! with the product/scan-mode scope it applies to and the data it needs to be
//! present. Numeric constants (bin counts, spacing, height grids) live in the
//! product catalog; labels that are not sensor tables live here.

use granule_model::{ArrayData, Granule};
use product_catalog::{PmwFrequencyTable, ProductDescriptor};
use tracing::debug;

use crate::attrs::UNITS;
use crate::error::{DecodeError, Result};
use crate::warning::{Diagnostics, WarningKind};

pub const RANGE_DIM: &str = "range";
pub const NLAYER_DIM: &str = "nlayer";

const RANGE_PRODUCTS: &[&str] = &[
    "2A-DPR",
    "2A-Ku",
    "2A-Ka",
    "2A-PR",
    "2B-GPM-CORRA",
    "2B-TRMM-CORRA",
];

const SINGLE_RADAR_2A: &[&str] = &["2A-DPR", "2A-Ku", "2A-Ka", "2A-PR"];

const LATENT_HEATING_PRODUCTS: &[&str] = &["2A-GPM-SLH", "2A-TRMM-SLH", "2B-GPM-CSH", "2B-TRMM-CSH"];

/// GMI channels used by the GPM combined retrieval.
pub const GPM_CORRA_PMW_FREQUENCIES: &[&str] = &[
    "10V", "10H", "19V", "19H", "23V", "37V", "37H", "89V", "89H", "165V", "165H", "183V3",
    "183V7",
];

pub const RADAR_FREQUENCIES: &[&str] = &["Ku", "Ka"];
pub const DSD_PARAMS: &[&str] = &["Nw", "Dm"];

/// Which products a rule applies to.
#[derive(Debug, Clone, Copy)]
pub enum ProductScope {
    Any,
    /// Products whose short level matches, e.g. `1C`.
    ShortLevel(&'static str),
    Products(&'static [&'static str]),
}

impl ProductScope {
    pub fn matches(&self, descriptor: &ProductDescriptor) -> bool {
        match self {
            ProductScope::Any => true,
            ProductScope::ShortLevel(level) => descriptor.short_level() == *level,
            ProductScope::Products(ids) => ids.contains(&descriptor.id.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ScanModeScope {
    Any,
    Only(&'static [&'static str]),
}

impl ScanModeScope {
    pub fn matches(&self, scan_mode: &str) -> bool {
        match self {
            ScanModeScope::Any => true,
            ScanModeScope::Only(modes) => modes.contains(&scan_mode),
        }
    }
}

/// What must exist in the granule for a rule to fire.
#[derive(Debug, Clone, Copy)]
pub enum Requirement {
    Dimension(&'static str),
    DataVariable(&'static str),
}

/// Where the coordinate values come from.
#[derive(Debug, Clone, Copy)]
pub enum CoordinateSource {
    /// Zero-based index along the required dimension.
    BinIndex,
    /// `bins * spacing` distances from the catalog scan-mode constants.
    RangeDistance,
    /// Frequency labels for the product sensor and scan mode.
    PmwFrequencyTable,
    Labels(&'static [&'static str]),
    /// Rename the required dimension to the coordinate name and attach the
    /// catalog height grid.
    HeightGrid,
    /// Promote an existing data variable.
    Promote,
}

#[derive(Debug, Clone, Copy)]
pub struct CoordinateRule {
    pub coordinate: &'static str,
    pub requires: Requirement,
    pub products: ProductScope,
    pub scan_modes: ScanModeScope,
    pub source: CoordinateSource,
}

pub static COORDINATE_RULES: &[CoordinateRule] = &[
    CoordinateRule {
        coordinate: "gpm_range_id",
        requires: Requirement::Dimension(RANGE_DIM),
        products: ProductScope::Any,
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::BinIndex,
    },
    CoordinateRule {
        coordinate: "range",
        requires: Requirement::Dimension(RANGE_DIM),
        products: ProductScope::Products(RANGE_PRODUCTS),
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::RangeDistance,
    },
    CoordinateRule {
        coordinate: "pmw_frequency",
        requires: Requirement::Dimension("pmw_frequency"),
        products: ProductScope::ShortLevel("1C"),
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::PmwFrequencyTable,
    },
    CoordinateRule {
        coordinate: "pmw_frequency",
        requires: Requirement::Dimension("pmw_frequency"),
        products: ProductScope::Products(&["2B-GPM-CORRA"]),
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::Labels(GPM_CORRA_PMW_FREQUENCIES),
    },
    CoordinateRule {
        coordinate: "radar_frequency",
        requires: Requirement::Dimension("radar_frequency"),
        products: ProductScope::Products(&["2A-DPR"]),
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::Labels(RADAR_FREQUENCIES),
    },
    CoordinateRule {
        coordinate: "radar_frequency",
        requires: Requirement::Dimension("radar_frequency"),
        products: ProductScope::Products(&["2B-GPM-CORRA"]),
        scan_modes: ScanModeScope::Only(&["KuKaGMI", "NS"]),
        source: CoordinateSource::Labels(RADAR_FREQUENCIES),
    },
    CoordinateRule {
        coordinate: "DSD_params",
        requires: Requirement::Dimension("DSD_params"),
        products: ProductScope::Products(SINGLE_RADAR_2A),
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::Labels(DSD_PARAMS),
    },
    CoordinateRule {
        coordinate: "height",
        requires: Requirement::DataVariable("height"),
        products: ProductScope::Products(SINGLE_RADAR_2A),
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::Promote,
    },
    CoordinateRule {
        coordinate: "height",
        requires: Requirement::Dimension(NLAYER_DIM),
        products: ProductScope::Products(LATENT_HEATING_PRODUCTS),
        scan_modes: ScanModeScope::Any,
        source: CoordinateSource::HeightGrid,
    },
];

/// Product context for coordinate synthesis.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisContext<'a> {
    pub descriptor: &'a ProductDescriptor,
    pub scan_mode: &'a str,
    pub frequencies: &'a PmwFrequencyTable,
}

impl CoordinateRule {
    pub fn is_scoped_to(&self, descriptor: &ProductDescriptor, scan_mode: &str) -> bool {
        self.products.matches(descriptor) && self.scan_modes.matches(scan_mode)
    }

    fn is_present(&self, granule: &Granule) -> bool {
        match self.requires {
            Requirement::Dimension(dim) => granule.has_dim(dim),
            Requirement::DataVariable(name) => granule.contains_data_var(name),
        }
    }

    /// Attach the coordinate if the rule applies. Returns whether it did.
    pub fn apply(
        &self,
        granule: &mut Granule,
        ctx: &SynthesisContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<bool> {
        if !self.is_scoped_to(ctx.descriptor, ctx.scan_mode) || !self.is_present(granule) {
            return Ok(false);
        }

        let dim = match self.requires {
            Requirement::Dimension(dim) => dim,
            Requirement::DataVariable(_) => self.coordinate,
        };
        let constants = ctx.descriptor.constants(ctx.scan_mode);

        match self.source {
            CoordinateSource::BinIndex => {
                let size = granule.dim_size(dim).unwrap_or_default();
                let index: Vec<f64> = (0..size).map(|i| i as f64).collect();
                granule.assign_coord(self.coordinate, dim, index)?;
            }
            CoordinateSource::RangeDistance => {
                let Some(range) = constants.and_then(|c| c.range) else {
                    debug!(
                        product = %ctx.descriptor.id,
                        scan_mode = ctx.scan_mode,
                        "No range constants in catalog"
                    );
                    return Ok(false);
                };
                let coord = granule.assign_coord(self.coordinate, dim, range.distances())?;
                coord.attrs.insert(UNITS.to_string(), "m".into());
            }
            CoordinateSource::PmwFrequencyTable => {
                let sensor = &ctx.descriptor.sensor;
                let Some(labels) = ctx.frequencies.frequencies(sensor, ctx.scan_mode) else {
                    diagnostics.warn(
                        WarningKind::MissingFrequencies,
                        0,
                        format!(
                            "No PMW frequencies known for sensor {} scan mode {}; '{}' left unlabelled",
                            sensor, ctx.scan_mode, self.coordinate
                        ),
                    );
                    return Ok(false);
                };
                granule.assign_coord(self.coordinate, dim, labels.to_vec())?;
            }
            CoordinateSource::Labels(labels) => {
                granule.assign_coord(self.coordinate, dim, ArrayData::from(labels))?;
            }
            CoordinateSource::HeightGrid => {
                let Some(grid) = constants.and_then(|c| c.height_grid) else {
                    return Ok(false);
                };
                let size = granule.dim_size(dim).unwrap_or_default();
                if size != grid.levels {
                    return Err(DecodeError::CoordinateLengthMismatch {
                        coordinate: self.coordinate.to_string(),
                        dimension: dim.to_string(),
                        expected: size,
                        actual: grid.levels,
                    });
                }
                granule.rename_dim(dim, self.coordinate)?;
                let coord =
                    granule.assign_coord(self.coordinate, self.coordinate, grid.heights())?;
                coord.attrs.insert(UNITS.to_string(), "m a.s.l".into());
            }
            CoordinateSource::Promote => {
                granule.set_coord(self.coordinate)?;
            }
        }

        debug!(
            coordinate = self.coordinate,
            product = %ctx.descriptor.id,
            scan_mode = ctx.scan_mode,
            "Synthesized coordinate"
        );
        Ok(true)
    }
}

/// Apply every coordinate rule in order. Returns the number applied.
pub fn synthesize_coordinates(
    granule: &mut Granule,
    ctx: &SynthesisContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<usize> {
    let mut applied = 0;
    for rule in COORDINATE_RULES {
        if rule.apply(granule, ctx, diagnostics)? {
            applied += 1;
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use granule_model::Variable;
    use product_catalog::ProductCatalog;

    struct Fixture {
        catalog: ProductCatalog,
        frequencies: PmwFrequencyTable,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: ProductCatalog::builtin().unwrap(),
                frequencies: PmwFrequencyTable::builtin().unwrap(),
            }
        }

        fn synthesize(&self, granule: &mut Granule, product: &str, scan_mode: &str) -> Result<usize> {
            let ctx = SynthesisContext {
                descriptor: self.catalog.get(product).unwrap(),
                scan_mode,
                frequencies: &self.frequencies,
            };
            synthesize_coordinates(granule, &ctx, &mut Diagnostics::new())
        }
    }

    fn with_dim(dim: &str, size: usize) -> Granule {
        let mut granule = Granule::new();
        granule
            .insert_data_var("data", Variable::along(dim, vec![0.0; size]))
            .unwrap();
        granule
    }

    #[test]
    fn test_rules_reference_catalog_products() {
        let fixture = Fixture::new();
        for rule in COORDINATE_RULES {
            if let ProductScope::Products(ids) = rule.products {
                for id in ids {
                    assert!(fixture.catalog.get(id).is_some(), "{} not in catalog", id);
                }
            }
        }
    }

    #[test]
    fn test_range_coordinates() {
        let fixture = Fixture::new();
        let mut granule = with_dim("range", 176);
        fixture.synthesize(&mut granule, "2A-Ku", "FS").unwrap();

        let range = granule.coord("range").unwrap().values().unwrap();
        assert_eq!(range[0], 0.0);
        assert_eq!(range[175], 175.0 * 125.0);
        let ids = granule.coord("gpm_range_id").unwrap().values().unwrap();
        assert_eq!(ids[10], 10.0);
    }

    #[test]
    fn test_range_length_mismatch() {
        let fixture = Fixture::new();
        let mut granule = with_dim("range", 130);
        let err = fixture.synthesize(&mut granule, "2A-DPR", "HS").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::CoordinateLengthMismatch { expected: 130, actual: 88, .. }
        ));
    }

    #[test]
    fn test_range_outside_radar_products() {
        let fixture = Fixture::new();
        let mut granule = with_dim("range", 10);
        assert_eq!(fixture.synthesize(&mut granule, "2A-GMI", "S1").unwrap(), 1);
        assert!(granule.coord("range").is_none());
        assert!(granule.coord("gpm_range_id").is_some());
    }

    #[test]
    fn test_pmw_frequency_from_table() {
        let fixture = Fixture::new();
        let mut granule = with_dim("pmw_frequency", 4);
        fixture.synthesize(&mut granule, "1C-GMI", "S2").unwrap();
        let labels = granule.coord("pmw_frequency").unwrap().labels().unwrap();
        assert_eq!(labels, ["165V", "165H", "183V3", "183V7"]);
    }

    #[test]
    fn test_missing_frequency_entry_warns() {
        let fixture = Fixture::new();
        let frequencies = PmwFrequencyTable::from_yaml_str("GMI:\n  S1: [10V]\n", "test").unwrap();
        let ctx = SynthesisContext {
            descriptor: fixture.catalog.get("1C-GMI").unwrap(),
            scan_mode: "S2",
            frequencies: &frequencies,
        };
        let mut granule = with_dim("pmw_frequency", 4);
        let mut diagnostics = Diagnostics::new();
        synthesize_coordinates(&mut granule, &ctx, &mut diagnostics).unwrap();

        assert!(granule.coord("pmw_frequency").is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.iter().next().unwrap().kind,
            WarningKind::MissingFrequencies
        );
    }

    #[test]
    fn test_corra_radar_frequency_scan_modes() {
        let fixture = Fixture::new();
        let mut granule = with_dim("radar_frequency", 2);
        fixture.synthesize(&mut granule, "2B-GPM-CORRA", "KuGMI").unwrap();
        assert!(granule.coord("radar_frequency").is_none());

        fixture.synthesize(&mut granule, "2B-GPM-CORRA", "KuKaGMI").unwrap();
        assert_eq!(
            granule.coord("radar_frequency").unwrap().labels().unwrap(),
            ["Ku", "Ka"]
        );
    }

    #[test]
    fn test_height_promotion() {
        let fixture = Fixture::new();
        let mut granule = with_dim("range", 176);
        granule
            .insert_data_var("height", Variable::along("range", vec![1.0; 176]))
            .unwrap();
        fixture.synthesize(&mut granule, "2A-DPR", "FS").unwrap();
        assert!(granule.coord("height").is_some());
        assert!(!granule.contains_data_var("height"));
    }

    #[test]
    fn test_latent_heating_height_grid() {
        let fixture = Fixture::new();
        let mut granule = with_dim("nlayer", 80);
        fixture.synthesize(&mut granule, "2A-GPM-SLH", "Swath").unwrap();

        assert!(!granule.has_dim("nlayer"));
        let height = granule.coord("height").unwrap();
        assert_eq!(height.dims(), ["height"]);
        let values = height.values().unwrap();
        assert_eq!(values[0], 125.0);
        assert_eq!(values[79], 19875.0);
        assert_eq!(granule.data_var("data").unwrap().dims(), ["height"]);
    }

    #[test]
    fn test_height_grid_checks_length_first() {
        let fixture = Fixture::new();
        let mut granule = with_dim("nlayer", 60);
        let err = fixture.synthesize(&mut granule, "2B-GPM-CSH", "Swath").unwrap_err();
        assert!(matches!(err, DecodeError::CoordinateLengthMismatch { actual: 80, .. }));
        assert!(granule.has_dim("nlayer"));
    }
}
