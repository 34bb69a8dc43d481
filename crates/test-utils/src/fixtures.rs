//! Common test fixtures for granule decoding tests.
//!
//! Product identifiers and scan modes that match the built-in catalog, plus
//! legacy attribute sets as they appear in raw HDF5 granules.

use granule_model::{AttrValue, Attributes, Granule};

/// Product identifiers used across the test suite.
pub mod products {
    pub const DPR_2A: &str = "2A-DPR";
    pub const KU_2A: &str = "2A-Ku";
    pub const PR_2A: &str = "2A-PR";
    pub const GMI_1C: &str = "1C-GMI";
    pub const GMI_2A: &str = "2A-GMI";
    pub const MHS_2A: &str = "2A-MHS-METOPB";
    pub const GPM_CORRA: &str = "2B-GPM-CORRA";
    pub const TRMM_CORRA: &str = "2B-TRMM-CORRA";
    pub const GPM_SLH: &str = "2A-GPM-SLH";
    pub const GPM_CSH: &str = "2B-GPM-CSH";
}

/// Scan modes paired with the products above.
pub mod scan_modes {
    /// DPR full swath (V7).
    pub const FS: &str = "FS";
    /// DPR high-sensitivity swath.
    pub const HS: &str = "HS";
    /// Normal swath (V6 and earlier).
    pub const NS: &str = "NS";
    pub const S1: &str = "S1";
    pub const S2: &str = "S2";
    pub const KUKAGMI: &str = "KuKaGMI";
    pub const KUGMI: &str = "KuGMI";
    pub const KUTMI: &str = "KuTMI";
    /// Latent heating products have a single swath.
    pub const SWATH: &str = "Swath";
}

/// Geolocation values for building swaths.
pub mod geo {
    /// A latitude just past the pole.
    pub const INVALID_LAT: f64 = 95.0;
    /// A longitude past the antimeridian.
    pub const INVALID_LON: f64 = 200.0;
    /// Fill value HDF5 granules use for missing geolocation.
    pub const FILL: f64 = -9999.9;
}

/// Attributes in the legacy HDF5 style: `CodeMissingValue`, `Units`, `DimensionNames`.
pub fn legacy_attrs(units: &str, fill: f64) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("CodeMissingValue".to_string(), AttrValue::Float(fill));
    attrs.insert("Units".to_string(), AttrValue::from(units));
    attrs.insert(
        "DimensionNames".to_string(),
        AttrValue::from("nscan,nray"),
    );
    attrs
}

/// Deserialize a granule from JSON, panicking on malformed input.
pub fn granule_from_json(json: &str) -> Granule {
    serde_json::from_str(json).expect("fixture granule JSON is valid")
}
