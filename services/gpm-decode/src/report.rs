//! Per-granule summaries printed after decoding.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use granule_decoder::{DecodeWarning, DecodedGranule};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GranuleSummary {
    pub file: String,
    pub product: String,
    pub scan_mode: String,
    pub dimensions: BTreeMap<String, usize>,
    pub coordinates: Vec<String>,
    pub data_variables: Vec<String>,
    pub warnings: Vec<DecodeWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl GranuleSummary {
    pub fn new(file: &Path, decoded: &DecodedGranule) -> Self {
        let granule = &decoded.granule;
        Self {
            file: file.display().to_string(),
            product: decoded.product.clone(),
            scan_mode: decoded.scan_mode.clone(),
            dimensions: granule.dims(),
            coordinates: granule.coord_names(),
            data_variables: granule.data_var_names(),
            warnings: decoded.warnings().cloned().collect(),
            output: None,
        }
    }
}

impl fmt::Display for GranuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self
            .dimensions
            .iter()
            .map(|(name, size)| format!("{}={}", name, size))
            .collect();
        write!(
            f,
            "{} [{} {}] dims({}) coords({}) vars({}) warnings={}",
            self.file,
            self.product,
            self.scan_mode,
            dims.join(", "),
            self.coordinates.join(", "),
            self.data_variables.len(),
            self.warnings.len()
        )?;
        if let Some(output) = &self.output {
            write!(f, " -> {}", output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granule_decoder::decode;
    use test_utils::{create_index_field, SwathBuilder};

    #[test]
    fn test_summary_lists_warnings() {
        let raw = SwathBuilder::new(2, 2)
            .lat_at(0, 0, 95.0)
            .with_field("surfacePrecipitation", create_index_field(2, 2))
            .build();
        let decoded = decode(raw, "2A-GMI", "S1", false).unwrap();
        let summary = GranuleSummary::new(Path::new("granule.json"), &decoded);

        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.dimensions["cross_track"], 2);
        assert_eq!(summary.data_variables, ["surfacePrecipitation"]);

        let line = summary.to_string();
        assert!(line.starts_with("granule.json [2A-GMI S1]"));
        assert!(line.contains("warnings=1"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["warnings"][0]["kind"], "invalid_coordinates");
        assert!(json.get("output").is_none());
    }
}
