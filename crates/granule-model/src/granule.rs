//! The granule container: coordinates, data variables and global attributes.

use crate::array::ArrayData;
use crate::attrs::Attributes;
use crate::error::{GranuleError, GranuleResult};
use crate::mask::Mask;
use crate::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// One product / scan mode / time window worth of labeled arrays.
///
/// Dimensions are not stored separately: they are derived from the variables,
/// and every insertion checks that a dimension keeps a single size across the
/// whole granule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Granule {
    #[serde(default)]
    coords: BTreeMap<String, Variable>,
    #[serde(default)]
    data_vars: BTreeMap<String, Variable>,
    #[serde(default)]
    pub attrs: Attributes,
}

impl Granule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension sizes across every variable.
    pub fn dims(&self) -> BTreeMap<String, usize> {
        let mut dims = BTreeMap::new();
        for var in self.variables() {
            for (dim, size) in var.dims().iter().zip(var.shape()) {
                dims.entry(dim.clone()).or_insert(*size);
            }
        }
        dims
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dim_size(dim).is_some()
    }

    pub fn dim_size(&self, dim: &str) -> Option<usize> {
        self.variables().find_map(|v| v.dim_size(dim))
    }

    /// Check every variable's shape and the granule-wide dimension sizes.
    pub fn validate(&self) -> GranuleResult<()> {
        let mut sizes: BTreeMap<&str, (usize, &str)> = BTreeMap::new();
        for (name, var) in self.coords.iter().chain(&self.data_vars) {
            var.check(name)?;
            for (dim, &size) in var.dims().iter().zip(var.shape()) {
                match sizes.get(dim.as_str()) {
                    Some(&(existing, _)) if existing != size => {
                        return Err(GranuleError::DimensionSizeConflict {
                            dimension: dim.clone(),
                            variable: name.clone(),
                            existing,
                            found: size,
                        });
                    }
                    Some(_) => {}
                    None => {
                        sizes.insert(dim, (size, name));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_insert(&self, name: &str, var: &Variable) -> GranuleResult<()> {
        var.check(name)?;
        for (dim, &size) in var.dims().iter().zip(var.shape()) {
            let existing = self
                .coords
                .iter()
                .chain(&self.data_vars)
                .filter(|(other, _)| other.as_str() != name)
                .find_map(|(_, v)| v.dim_size(dim));
            if let Some(existing) = existing {
                if existing != size {
                    return Err(GranuleError::DimensionSizeConflict {
                        dimension: dim.clone(),
                        variable: name.to_string(),
                        existing,
                        found: size,
                    });
                }
            }
        }
        Ok(())
    }

    /// Insert or replace a data variable.
    pub fn insert_data_var(&mut self, name: impl Into<String>, var: Variable) -> GranuleResult<()> {
        let name = name.into();
        self.check_insert(&name, &var)?;
        self.coords.remove(&name);
        self.data_vars.insert(name, var);
        Ok(())
    }

    /// Insert or replace a coordinate variable.
    pub fn insert_coord(&mut self, name: impl Into<String>, var: Variable) -> GranuleResult<()> {
        let name = name.into();
        self.check_insert(&name, &var)?;
        self.data_vars.remove(&name);
        self.coords.insert(name, var);
        Ok(())
    }

    /// Attach a one-dimensional coordinate along an existing dimension.
    ///
    /// The values must match the dimension length exactly; nothing is
    /// truncated or broadcast. Any previous coordinate of that name is replaced.
    pub fn assign_coord(
        &mut self,
        name: &str,
        dim: &str,
        data: impl Into<ArrayData>,
    ) -> GranuleResult<&mut Variable> {
        let data = data.into();
        if data.ndim() != 1 {
            return Err(GranuleError::RankMismatch {
                variable: name.to_string(),
                dims: 1,
                shape: data.ndim(),
            });
        }
        let expected = self
            .dim_size(dim)
            .ok_or_else(|| GranuleError::MissingDimension(dim.to_string()))?;
        if data.len() != expected {
            return Err(GranuleError::CoordinateLengthMismatch {
                coordinate: name.to_string(),
                dimension: dim.to_string(),
                expected,
                actual: data.len(),
            });
        }
        self.data_vars.remove(name);
        let coord = Variable::along(dim, data);
        let slot = match self.coords.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(coord);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(coord),
        };
        Ok(slot)
    }

    /// Promote a data variable to a coordinate.
    pub fn set_coord(&mut self, name: &str) -> GranuleResult<()> {
        let var = self
            .data_vars
            .remove(name)
            .ok_or_else(|| GranuleError::MissingVariable(name.to_string()))?;
        self.coords.insert(name.to_string(), var);
        Ok(())
    }

    /// Rename a dimension on every variable that spans it.
    pub fn rename_dim(&mut self, old: &str, new: &str) -> GranuleResult<()> {
        if !self.has_dim(old) {
            return Err(GranuleError::MissingDimension(old.to_string()));
        }
        if old != new && self.has_dim(new) {
            return Err(GranuleError::DimensionExists(new.to_string()));
        }
        for var in self.coords.values_mut().chain(self.data_vars.values_mut()) {
            var.rename_dim(old, new);
        }
        Ok(())
    }

    /// Whether `name` is a data variable or a coordinate.
    pub fn contains(&self, name: &str) -> bool {
        self.data_vars.contains_key(name) || self.coords.contains_key(name)
    }

    pub fn contains_data_var(&self, name: &str) -> bool {
        self.data_vars.contains_key(name)
    }

    pub fn data_var(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name)
    }

    pub fn data_var_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.data_vars.get_mut(name)
    }

    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    /// Look up a variable among coordinates first, then data variables.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name).or_else(|| self.data_vars.get(name))
    }

    pub fn remove_data_var(&mut self, name: &str) -> Option<Variable> {
        self.data_vars.remove(name)
    }

    pub fn data_var_names(&self) -> Vec<String> {
        self.data_vars.keys().cloned().collect()
    }

    pub fn coord_names(&self) -> Vec<String> {
        self.coords.keys().cloned().collect()
    }

    pub fn data_vars(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.data_vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn data_vars_mut(&mut self) -> impl Iterator<Item = (&str, &mut Variable)> {
        self.data_vars.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn coords(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.coords.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Coordinates followed by data variables.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.coords.values().chain(self.data_vars.values())
    }

    /// Mask every numeric variable (coordinates included) at flagged samples.
    ///
    /// Returns the total number of values that became missing.
    pub fn apply_mask(&mut self, mask: &Mask) -> usize {
        self.coords
            .values_mut()
            .chain(self.data_vars.values_mut())
            .map(|v| v.apply_mask(mask))
            .sum()
    }
}
