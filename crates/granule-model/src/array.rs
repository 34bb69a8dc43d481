//! Array storage for granule variables.

use ndarray::{Array1, ArrayD, Axis, IxDyn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GranuleError, GranuleResult};

/// Values of a variable as an n-dimensional array.
///
/// Numeric data uses NaN as the missing-value convention once decoded.
/// Label data holds categorical coordinate values such as `"Ku"` / `"Ka"`.
/// Arrays are kept in standard (row-major) layout.
#[derive(Debug, Clone)]
pub enum ArrayData {
    Numeric(ArrayD<f64>),
    Labels(ArrayD<String>),
}

fn standard<A: Clone>(array: ArrayD<A>) -> ArrayD<A> {
    if array.is_standard_layout() {
        array
    } else {
        array.as_standard_layout().into_owned()
    }
}

fn shaped<A>(shape: &[usize], values: Vec<A>) -> GranuleResult<ArrayD<A>> {
    let count = values.len();
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| GranuleError::InvalidShape {
        shape: shape.to_vec(),
        values: count,
    })
}

impl ArrayData {
    /// Arrange flat row-major numeric values into `shape`.
    pub fn numeric(shape: &[usize], values: Vec<f64>) -> GranuleResult<Self> {
        shaped(shape, values).map(ArrayData::Numeric)
    }

    /// Arrange flat row-major labels into `shape`.
    pub fn labels(shape: &[usize], values: Vec<String>) -> GranuleResult<Self> {
        shaped(shape, values).map(ArrayData::Labels)
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayData::Numeric(a) => a.shape(),
            ArrayData::Labels(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Numeric(a) => a.len(),
            ArrayData::Labels(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&ArrayD<f64>> {
        match self {
            ArrayData::Numeric(a) => Some(a),
            ArrayData::Labels(_) => None,
        }
    }

    pub fn as_numeric_mut(&mut self) -> Option<&mut ArrayD<f64>> {
        match self {
            ArrayData::Numeric(a) => Some(a),
            ArrayData::Labels(_) => None,
        }
    }

    pub fn as_labels(&self) -> Option<&ArrayD<String>> {
        match self {
            ArrayData::Labels(a) => Some(a),
            ArrayData::Numeric(_) => None,
        }
    }

    /// Sub-array at `index` along `axis`, with that axis removed.
    ///
    /// Panics when the axis or index is out of bounds; callers check first.
    pub(crate) fn index_axis(&self, axis: usize, index: usize) -> ArrayData {
        match self {
            ArrayData::Numeric(a) => a.index_axis(Axis(axis), index).to_owned().into(),
            ArrayData::Labels(a) => a.index_axis(Axis(axis), index).to_owned().into(),
        }
    }

    /// Number of missing (NaN) values. Labels are never missing.
    pub fn missing_count(&self) -> usize {
        match self {
            ArrayData::Numeric(a) => a.iter().filter(|x| x.is_nan()).count(),
            ArrayData::Labels(_) => 0,
        }
    }
}

impl From<ArrayD<f64>> for ArrayData {
    fn from(array: ArrayD<f64>) -> Self {
        ArrayData::Numeric(standard(array))
    }
}

impl From<ArrayD<String>> for ArrayData {
    fn from(array: ArrayD<String>) -> Self {
        ArrayData::Labels(standard(array))
    }
}

impl From<Vec<f64>> for ArrayData {
    fn from(values: Vec<f64>) -> Self {
        ArrayData::Numeric(Array1::from(values).into_dyn())
    }
}

impl From<Vec<String>> for ArrayData {
    fn from(values: Vec<String>) -> Self {
        ArrayData::Labels(Array1::from(values).into_dyn())
    }
}

impl From<&[&str]> for ArrayData {
    fn from(values: &[&str]) -> Self {
        values.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }
}

// Missing values compare equal so decoded granules can be compared directly.
impl PartialEq for ArrayData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArrayData::Numeric(a), ArrayData::Numeric(b)) => {
                a.shape() == b.shape()
                    && a
                        .iter()
                        .zip(b.iter())
                        .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
            }
            (ArrayData::Labels(a), ArrayData::Labels(b)) => a == b,
            _ => false,
        }
    }
}

/// Flat row-major form of [`ArrayData`] used on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub(crate) enum FlatData {
    Numeric(#[serde(with = "nan_as_null")] Vec<f64>),
    Labels(Vec<String>),
}

impl FlatData {
    pub(crate) fn into_array(self, shape: &[usize]) -> GranuleResult<ArrayData> {
        match self {
            FlatData::Numeric(values) => ArrayData::numeric(shape, values),
            FlatData::Labels(values) => ArrayData::labels(shape, values),
        }
    }
}

impl From<&ArrayData> for FlatData {
    fn from(data: &ArrayData) -> Self {
        match data {
            ArrayData::Numeric(a) => FlatData::Numeric(a.iter().copied().collect()),
            ArrayData::Labels(a) => FlatData::Labels(a.iter().cloned().collect()),
        }
    }
}

/// JSON has no NaN, so missing values travel as `null`.
mod nan_as_null {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let opt: Vec<Option<f64>> = values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        opt.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let opt: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(opt.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, ArrayD};

    #[test]
    fn test_nan_equality() {
        let a = ArrayData::from(vec![1.0, f64::NAN]);
        let b = ArrayData::from(vec![1.0, f64::NAN]);
        assert_eq!(a, b);
        assert_ne!(a, ArrayData::from(vec![1.0, 2.0]));
        assert_ne!(a, ArrayData::from(vec!["1".to_string(), "2".to_string()]));
        // Same values, different shape.
        assert_ne!(a, ArrayData::numeric(&[1, 2], vec![1.0, f64::NAN]).unwrap());
    }

    #[test]
    fn test_missing_travels_as_null() {
        let data = ArrayData::from(vec![0.5, f64::NAN]);
        let json = serde_json::to_string(&FlatData::from(&data)).unwrap();
        assert_eq!(json, r#"{"kind":"numeric","values":[0.5,null]}"#);

        let back: FlatData = serde_json::from_str(&json).unwrap();
        let back = back.into_array(&[2]).unwrap();
        assert_eq!(back.missing_count(), 1);
        assert_eq!(back, data);
    }

    #[test]
    fn test_shape_must_hold_values() {
        assert_eq!(
            ArrayData::numeric(&[2, 2], vec![1.0; 3]).unwrap_err(),
            GranuleError::InvalidShape {
                shape: vec![2, 2],
                values: 3
            }
        );
    }

    #[test]
    fn test_transposed_input_is_stored_row_major() {
        let t: ArrayD<f64> = arr2(&[[1.0, 2.0], [3.0, 4.0]]).reversed_axes().into_dyn();
        let data = ArrayData::from(t);
        let values = data.as_numeric().unwrap();
        assert!(values.is_standard_layout());
        assert_eq!(values.as_slice().unwrap(), &[1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_labels() {
        let data = ArrayData::from(&["Ku", "Ka"][..]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.as_labels().unwrap().as_slice().unwrap()[1], "Ka");
        assert!(data.as_numeric().is_none());
        assert_eq!(data.missing_count(), 0);
    }
}
