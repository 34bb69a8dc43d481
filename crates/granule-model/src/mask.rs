//! Boolean sample masks over a subset of granule dimensions.

use ndarray::{ArrayD, IxDyn, Zip};

use crate::error::{GranuleError, GranuleResult};
use crate::variable::Variable;

/// A boolean array over named dimensions; `true` marks a sample to be masked.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    dims: Vec<String>,
    values: ArrayD<bool>,
}

impl Mask {
    /// Build a mask from flat row-major flags.
    pub fn new(dims: Vec<String>, shape: Vec<usize>, values: Vec<bool>) -> GranuleResult<Self> {
        if dims.len() != shape.len() {
            return Err(GranuleError::RankMismatch {
                variable: "<mask>".to_string(),
                dims: dims.len(),
                shape: shape.len(),
            });
        }
        let count = values.len();
        let values = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|_| GranuleError::InvalidShape { shape, values: count })?;
        Ok(Self { dims, values })
    }

    /// Build a mask over the dimensions of a numeric variable.
    ///
    /// Missing values never satisfy the predicate.
    pub fn from_variable(
        name: &str,
        variable: &Variable,
        predicate: impl Fn(f64) -> bool,
    ) -> GranuleResult<Self> {
        let values = variable
            .array()
            .ok_or_else(|| GranuleError::NotNumeric(name.to_string()))?;
        Ok(Self {
            dims: variable.dims().to_vec(),
            values: values.mapv(|v| !v.is_nan() && predicate(v)),
        })
    }

    /// Element-wise OR with a mask over the same dimensions.
    pub fn or(&self, other: &Mask) -> GranuleResult<Mask> {
        if self.dims != other.dims || self.shape() != other.shape() {
            return Err(GranuleError::NotAligned {
                left: format!("{:?}", self.dims),
                right: format!("{:?}", other.dims),
            });
        }
        Ok(Mask {
            dims: self.dims.clone(),
            values: Zip::from(&self.values)
                .and(&other.values)
                .map_collect(|&a, &b| a || b),
        })
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn values(&self) -> &ArrayD<bool> {
        &self.values
    }

    /// Number of flagged samples.
    pub fn count(&self) -> usize {
        self.values.iter().filter(|v| **v).count()
    }

    pub fn any(&self) -> bool {
        self.values.iter().any(|v| *v)
    }
}
