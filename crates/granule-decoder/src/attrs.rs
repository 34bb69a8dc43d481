//! Attribute normalization: legacy HDF5 keys to canonical CF-style keys.

use granule_model::{Attributes, Encoding, Granule};

pub const FILL_VALUE: &str = "_FillValue";
pub const LEGACY_FILL_VALUE: &str = "CodeMissingValue";
pub const UNITS: &str = "units";
pub const LEGACY_UNITS: &str = "Units";
pub const LEGACY_DIMENSION_NAMES: &str = "DimensionNames";
pub const SOURCE_DTYPE: &str = "source_dtype";
/// Provenance tag naming the product a variable was decoded from.
pub const PRODUCT_TAG: &str = "gpm_product";

/// Normalize the attributes of one variable.
///
/// A legacy key is renamed to its canonical form only when the canonical key is
/// absent; either way the legacy key is gone afterwards.
pub fn normalize_attributes(attrs: &mut Attributes, encoding: &Encoding, product: Option<&str>) {
    rename_legacy(attrs, LEGACY_FILL_VALUE, FILL_VALUE);
    rename_legacy(attrs, LEGACY_UNITS, UNITS);
    attrs.remove(LEGACY_DIMENSION_NAMES);

    if let Some(dtype) = encoding.dtype() {
        attrs.insert(SOURCE_DTYPE.to_string(), dtype.into());
    }
    if let Some(product) = product {
        attrs.insert(PRODUCT_TAG.to_string(), product.into());
    }
}

fn rename_legacy(attrs: &mut Attributes, legacy: &str, canonical: &str) {
    if let Some(value) = attrs.remove(legacy) {
        attrs.entry(canonical.to_string()).or_insert(value);
    }
}

/// Normalize every data variable of a granule.
pub fn normalize_granule(granule: &mut Granule, product: Option<&str>) {
    for (_, var) in granule.data_vars_mut() {
        normalize_attributes(&mut var.attrs, &var.encoding, product);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granule_model::AttrValue;

    fn attrs(pairs: &[(&str, AttrValue)]) -> Attributes {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_legacy_fill_value_renamed() {
        let mut a = attrs(&[
            ("CodeMissingValue", AttrValue::Float(-9999.9)),
            ("Units", "mm/hr".into()),
            ("DimensionNames", "nscan,npixel".into()),
        ]);
        normalize_attributes(&mut a, &Encoding::new(), None);

        assert_eq!(a.get(FILL_VALUE), Some(&AttrValue::Float(-9999.9)));
        assert_eq!(a.get(UNITS), Some(&AttrValue::from("mm/hr")));
        assert!(!a.contains_key(LEGACY_FILL_VALUE));
        assert!(!a.contains_key(LEGACY_UNITS));
        assert!(!a.contains_key(LEGACY_DIMENSION_NAMES));
        assert!(!a.contains_key(PRODUCT_TAG));
    }

    #[test]
    fn test_canonical_value_wins() {
        let mut a = attrs(&[
            ("_FillValue", AttrValue::Float(-9999.0)),
            ("CodeMissingValue", AttrValue::Float(-9999.9)),
            ("units", "K".into()),
            ("Units", "degK".into()),
        ]);
        normalize_attributes(&mut a, &Encoding::new(), Some("1C-GMI"));

        assert_eq!(a.get(FILL_VALUE), Some(&AttrValue::Float(-9999.0)));
        assert_eq!(a.get(UNITS), Some(&AttrValue::from("K")));
        assert!(!a.contains_key(LEGACY_FILL_VALUE));
        assert!(!a.contains_key(LEGACY_UNITS));
        assert_eq!(a.get(PRODUCT_TAG), Some(&AttrValue::from("1C-GMI")));
    }

    #[test]
    fn test_source_dtype_from_encoding() {
        let mut encoding = Encoding::new();
        encoding.insert("dtype", "int16");
        let mut a = Attributes::new();
        normalize_attributes(&mut a, &encoding, None);
        assert_eq!(a.get(SOURCE_DTYPE), Some(&AttrValue::from("int16")));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut encoding = Encoding::new();
        encoding.insert("dtype", "float32");
        let mut a = attrs(&[("CodeMissingValue", AttrValue::Int(-99)), ("Units", "dBZ".into())]);
        normalize_attributes(&mut a, &encoding, Some("2A-DPR"));
        let once = a.clone();
        normalize_attributes(&mut a, &encoding, Some("2A-DPR"));
        assert_eq!(a, once);
    }
}
