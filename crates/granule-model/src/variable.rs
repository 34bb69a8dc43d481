//! Labeled n-dimensional variables.

use ndarray::{ArrayD, Zip};
use serde::{Deserialize, Serialize};

use crate::array::{ArrayData, FlatData};
use crate::attrs::{Attributes, Encoding};
use crate::error::{GranuleError, GranuleResult};
use crate::mask::Mask;

/// A named-dimension array with its attributes and encoding record.
///
/// The variable does not know its own name; the owning [`Granule`](crate::Granule)
/// keys it and validates it on insertion. On the wire the data travels flat
/// next to an explicit `shape`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VariableRepr", into = "VariableRepr")]
pub struct Variable {
    dims: Vec<String>,
    data: ArrayData,
    pub attrs: Attributes,
    pub encoding: Encoding,
}

#[derive(Serialize, Deserialize)]
struct VariableRepr {
    dims: Vec<String>,
    shape: Vec<usize>,
    data: FlatData,
    #[serde(default)]
    attrs: Attributes,
    #[serde(default)]
    encoding: Encoding,
}

impl TryFrom<VariableRepr> for Variable {
    type Error = GranuleError;

    fn try_from(repr: VariableRepr) -> GranuleResult<Self> {
        Ok(Self {
            data: repr.data.into_array(&repr.shape)?,
            dims: repr.dims,
            attrs: repr.attrs,
            encoding: repr.encoding,
        })
    }
}

impl From<Variable> for VariableRepr {
    fn from(var: Variable) -> Self {
        Self {
            shape: var.shape().to_vec(),
            data: FlatData::from(&var.data),
            dims: var.dims,
            attrs: var.attrs,
            encoding: var.encoding,
        }
    }
}

impl Variable {
    /// Create a variable from dimension names and an array.
    ///
    /// The array rank is checked against `dims` when the variable enters a
    /// granule.
    pub fn new<D: Into<String>>(dims: impl IntoIterator<Item = D>, data: impl Into<ArrayData>) -> Self {
        Self {
            dims: dims.into_iter().map(Into::into).collect(),
            data: data.into(),
            attrs: Attributes::new(),
            encoding: Encoding::new(),
        }
    }

    /// Create a numeric variable from flat row-major values.
    pub fn from_shape_vec<D: Into<String>>(
        dims: impl IntoIterator<Item = D>,
        shape: impl AsRef<[usize]>,
        values: Vec<f64>,
    ) -> GranuleResult<Self> {
        Ok(Self::new(dims, ArrayData::numeric(shape.as_ref(), values)?))
    }

    /// One-dimensional variable spanning `dim`.
    pub fn along(dim: &str, data: impl Into<ArrayData>) -> Self {
        Self::new([dim], data)
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn array(&self) -> Option<&ArrayD<f64>> {
        self.data.as_numeric()
    }

    pub fn array_mut(&mut self) -> Option<&mut ArrayD<f64>> {
        self.data.as_numeric_mut()
    }

    /// Numeric values in row-major order.
    pub fn values(&self) -> Option<&[f64]> {
        self.data.as_numeric()?.as_slice()
    }

    /// Labels in row-major order.
    pub fn labels(&self) -> Option<&[String]> {
        self.data.as_labels()?.as_slice()
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.axis(dim).is_some()
    }

    /// Axis position of a dimension.
    pub fn axis(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn dim_size(&self, dim: &str) -> Option<usize> {
        self.axis(dim).and_then(|a| self.shape().get(a).copied())
    }

    /// Check that every axis is named once.
    pub fn check(&self, name: &str) -> GranuleResult<()> {
        if self.dims.len() != self.data.ndim() {
            return Err(GranuleError::RankMismatch {
                variable: name.to_string(),
                dims: self.dims.len(),
                shape: self.data.ndim(),
            });
        }
        for (i, dim) in self.dims.iter().enumerate() {
            if self.dims[..i].contains(dim) {
                return Err(GranuleError::DuplicateDimension {
                    variable: name.to_string(),
                    dimension: dim.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn rename_dim(&mut self, old: &str, new: &str) {
        for dim in self.dims.iter_mut().filter(|d| *d == old) {
            *dim = new.to_string();
        }
    }

    /// Set values matching `predicate` to NaN. Returns how many values changed.
    ///
    /// Label data is left untouched.
    pub fn mask_values(&mut self, predicate: impl Fn(f64) -> bool) -> usize {
        let Some(values) = self.data.as_numeric_mut() else {
            return 0;
        };
        let mut masked = 0;
        values.map_inplace(|v| {
            if !v.is_nan() && predicate(*v) {
                *v = f64::NAN;
                masked += 1;
            }
        });
        masked
    }

    /// Apply `f` to every numeric value.
    pub fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        if let Some(values) = self.data.as_numeric_mut() {
            values.mapv_inplace(f);
        }
    }

    /// Set to NaN every value whose position is flagged by `mask`.
    ///
    /// The mask is broadcast over the variable's remaining dimensions. Variables
    /// that do not span every mask dimension, or hold labels, are left as is.
    /// Returns the number of values that became missing.
    pub fn apply_mask(&mut self, mask: &Mask) -> usize {
        let axes: Option<Vec<usize>> = mask.dims().iter().map(|d| self.axis(d)).collect();
        let Some(axes) = axes else {
            return 0;
        };
        let Some(values) = self.data.as_numeric_mut() else {
            return 0;
        };
        if axes.len() != mask.shape().len()
            || axes
                .iter()
                .zip(mask.shape())
                .any(|(&axis, &size)| values.shape().get(axis) != Some(&size))
        {
            return 0;
        }

        // Mask axes go last, in mask order, so the mask broadcasts over the rest.
        let mut order: Vec<usize> = (0..values.ndim()).filter(|a| !axes.contains(a)).collect();
        order.extend(&axes);
        let view = values.view_mut().permuted_axes(order);
        let Some(flags) = mask.values().broadcast(view.shape()) else {
            return 0;
        };

        let mut masked = 0;
        Zip::from(view).and(&flags).for_each(|v, &flag| {
            if flag && !v.is_nan() {
                *v = f64::NAN;
                masked += 1;
            }
        });
        masked
    }

    /// Select a single position along `dim`, dropping that dimension.
    pub fn index_axis(&self, dim: &str, index: usize) -> GranuleResult<Variable> {
        let axis = self
            .axis(dim)
            .ok_or_else(|| GranuleError::MissingDimension(dim.to_string()))?;
        let size = self
            .shape()
            .get(axis)
            .copied()
            .ok_or_else(|| GranuleError::MissingDimension(dim.to_string()))?;
        if index >= size {
            return Err(GranuleError::IndexOutOfBounds {
                dimension: dim.to_string(),
                index,
                size,
            });
        }

        let mut dims = self.dims.clone();
        dims.remove(axis);
        Ok(Variable {
            dims,
            data: self.data.index_axis(axis, index),
            attrs: self.attrs.clone(),
            encoding: self.encoding.clone(),
        })
    }

    /// Whether two variables share dimensions and shape exactly.
    pub fn is_aligned_with(&self, other: &Variable) -> bool {
        self.dims == other.dims && self.shape() == other.shape()
    }

    /// Element-wise combination of two aligned numeric variables.
    ///
    /// Attributes and encoding are taken from `self`. Returns `None` when the
    /// variables are not aligned or either holds labels.
    pub fn zip_with(&self, other: &Variable, f: impl Fn(f64, f64) -> f64) -> Option<Variable> {
        if !self.is_aligned_with(other) {
            return None;
        }
        let combined = Zip::from(self.array()?)
            .and(other.array()?)
            .map_collect(|&x, &y| f(x, y));
        Some(Variable {
            dims: self.dims.clone(),
            data: combined.into(),
            attrs: self.attrs.clone(),
            encoding: self.encoding.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Variable {
        // (along_track=2, cross_track=3, nwater=2), value = a*100 + c*10 + w
        let values = ArrayD::from_shape_fn(vec![2, 3, 2], |ix| {
            (ix[0] * 100 + ix[1] * 10 + ix[2]) as f64
        });
        Variable::new(["along_track", "cross_track", "nwater"], values)
    }

    #[test]
    fn test_check_catches_bad_dims() {
        let v = Variable::from_shape_vec(["x", "y"], [2], vec![1.0, 2.0]).unwrap();
        assert!(matches!(v.check("v"), Err(GranuleError::RankMismatch { dims: 2, shape: 1, .. })));

        let v = Variable::from_shape_vec(["x", "x"], [1, 1], vec![1.0]).unwrap();
        assert!(matches!(v.check("v"), Err(GranuleError::DuplicateDimension { .. })));

        assert!(matches!(
            Variable::from_shape_vec(["x"], [3], vec![1.0, 2.0]),
            Err(GranuleError::InvalidShape { values: 2, .. })
        ));

        assert!(cube().check("cube").is_ok());
    }

    #[test]
    fn test_index_trailing_axis() {
        let liquid = cube().index_axis("nwater", 0).unwrap();
        assert_eq!(liquid.dims(), &["along_track".to_string(), "cross_track".to_string()]);
        assert_eq!(liquid.shape(), &[2, 3]);
        assert_eq!(liquid.values().unwrap(), &[0.0, 10.0, 20.0, 100.0, 110.0, 120.0]);

        let solid = cube().index_axis("nwater", 1).unwrap();
        assert_eq!(solid.values().unwrap(), &[1.0, 11.0, 21.0, 101.0, 111.0, 121.0]);
    }

    #[test]
    fn test_index_middle_axis() {
        let v = cube().index_axis("cross_track", 2).unwrap();
        assert_eq!(v.shape(), &[2, 2]);
        assert_eq!(v.values().unwrap(), &[20.0, 21.0, 120.0, 121.0]);
    }

    #[test]
    fn test_index_labels() {
        let v = Variable::along("pmw_frequency", vec!["10V".to_string(), "10H".to_string()]);
        let picked = v.index_axis("pmw_frequency", 1).unwrap();
        assert!(picked.dims().is_empty());
        assert_eq!(picked.labels().unwrap(), &["10H".to_string()]);
    }

    #[test]
    fn test_index_out_of_bounds() {
        assert!(matches!(
            cube().index_axis("nwater", 2),
            Err(GranuleError::IndexOutOfBounds { index: 2, size: 2, .. })
        ));
        assert!(matches!(
            cube().index_axis("range", 0),
            Err(GranuleError::MissingDimension(_))
        ));
    }

    #[test]
    fn test_apply_mask_broadcasts() {
        let mask = Mask::new(
            vec!["along_track".into(), "cross_track".into()],
            vec![2, 3],
            vec![false, true, false, false, false, false],
        )
        .unwrap();
        let mut v = cube();
        assert_eq!(v.apply_mask(&mask), 2);
        let values = v.values().unwrap();
        assert!(values[2].is_nan() && values[3].is_nan());
        assert_eq!(values.iter().filter(|x| x.is_nan()).count(), 2);
    }

    #[test]
    fn test_apply_mask_follows_dimension_names() {
        // Mask dims in the opposite order from the variable's axes.
        let mask = Mask::new(
            vec!["cross_track".into(), "along_track".into()],
            vec![3, 2],
            vec![false, false, false, true, false, false],
        )
        .unwrap();
        let mut v = cube();
        assert_eq!(v.apply_mask(&mask), 2);
        // cross_track=1, along_track=1 -> values 110 and 111
        let values = v.values().unwrap();
        assert!(values[8].is_nan() && values[9].is_nan());
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn test_apply_mask_skips_unrelated_variables() {
        let mask = Mask::new(vec!["cross_track".into()], vec![3], vec![true, true, true]).unwrap();
        let mut range = Variable::along("range", vec![0.0, 250.0]);
        assert_eq!(range.apply_mask(&mask), 0);
        assert_eq!(range.values().unwrap(), &[0.0, 250.0]);
    }

    #[test]
    fn test_mask_values_and_zip() {
        let mut a = Variable::along("x", vec![-9999.0, 1.0]);
        assert_eq!(a.mask_values(|v| v == -9999.0), 1);
        assert_eq!(a.mask_values(|v| v == -9999.0), 0);

        let b = Variable::along("x", vec![2.0, 3.0]);
        let sum = b.zip_with(&b, |x, y| x + y).unwrap();
        assert_eq!(sum.values().unwrap(), &[4.0, 6.0]);
        assert!(b.zip_with(&Variable::along("y", vec![1.0, 1.0]), |x, y| x + y).is_none());
    }

    #[test]
    fn test_json_keeps_flat_layout() {
        let v = Variable::from_shape_vec(["x", "y"], [1, 2], vec![1.0, f64::NAN]).unwrap();
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["shape"], serde_json::json!([1, 2]));
        assert_eq!(json["data"]["values"], serde_json::json!([1.0, null]));

        let back: Variable = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);

        let bad = serde_json::json!({
            "dims": ["x"], "shape": [3],
            "data": {"kind": "numeric", "values": [1.0]}
        });
        assert!(serde_json::from_value::<Variable>(bad).is_err());
    }
}
