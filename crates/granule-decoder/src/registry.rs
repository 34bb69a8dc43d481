//! Per-variable decoding functions keyed by variable name.

use std::collections::HashMap;
use std::fmt;

use granule_model::{AttrValue, Granule, GranuleError, Variable};
use product_catalog::{ProductCategory, ProductDescriptor};
use tracing::debug;

use crate::error::{DecodeError, Result};

/// Attribute marking a variable as already decoded.
pub const DECODED_FLAG: &str = "gpm_decoded";

/// Sentinel for missing surface precipitation in PMW 2A products.
pub const SURFACE_PRECIPITATION_SENTINEL: f64 = -9999.0;

pub type VariableDecodeFn = fn(&mut Variable);

/// Variables to decode for every product of a category and short level.
#[derive(Debug, Clone)]
pub struct ProductDecoders {
    pub category: ProductCategory,
    pub level: &'static str,
    pub variables: &'static [&'static str],
}

impl ProductDecoders {
    fn matches(&self, descriptor: &ProductDescriptor) -> bool {
        self.category == descriptor.category && self.level == descriptor.short_level()
    }
}

#[derive(Clone)]
pub struct VariableDecoderRegistry {
    decoders: HashMap<String, VariableDecodeFn>,
    products: Vec<ProductDecoders>,
}

impl fmt::Debug for VariableDecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut variables: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        variables.sort_unstable();
        f.debug_struct("VariableDecoderRegistry")
            .field("decoders", &variables)
            .field("products", &self.products)
            .finish()
    }
}

impl Default for VariableDecoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl VariableDecoderRegistry {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
            products: Vec::new(),
        }
    }

    /// Registry with the decoders for PMW 2A products.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("surfacePrecipitation", decode_surface_precipitation);
        registry.register_product(ProductDecoders {
            category: ProductCategory::Pmw,
            level: "2A",
            variables: &["surfacePrecipitation"],
        });
        registry
    }

    pub fn register(&mut self, variable: impl Into<String>, decode: VariableDecodeFn) {
        self.decoders.insert(variable.into(), decode);
    }

    pub fn register_product(&mut self, decoders: ProductDecoders) {
        self.products.push(decoders);
    }

    pub fn get(&self, variable: &str) -> Option<VariableDecodeFn> {
        self.decoders.get(variable).copied()
    }

    /// Variables to decode for a product, in registration order.
    pub fn variables_for<'s>(
        &'s self,
        descriptor: &'s ProductDescriptor,
    ) -> impl Iterator<Item = &'static str> + 's {
        self.products
            .iter()
            .filter(move |p| p.matches(descriptor))
            .flat_map(|p| p.variables.iter().copied())
    }

    /// Decode one variable in place.
    ///
    /// Returns `false` when the variable carries the decoded flag already.
    pub fn decode_variable(&self, granule: &mut Granule, variable: &str) -> Result<bool> {
        let decode = self
            .get(variable)
            .ok_or_else(|| DecodeError::UnknownDecoder {
                variable: variable.to_string(),
            })?;
        let var = granule
            .data_var_mut(variable)
            .ok_or_else(|| GranuleError::MissingVariable(variable.to_string()))?;
        if is_decoded(var) {
            debug!(variable = variable, "Variable already decoded");
            return Ok(false);
        }
        decode(var);
        var.attrs.insert(DECODED_FLAG.to_string(), AttrValue::Bool(true));
        Ok(true)
    }

    /// Decode every registered variable of the product that the granule holds.
    pub fn decode_product(&self, granule: &mut Granule, descriptor: &ProductDescriptor) -> Result<usize> {
        let mut decoded = 0;
        for variable in self.variables_for(descriptor) {
            if !granule.contains_data_var(variable) {
                continue;
            }
            if self
                .decode_variable(granule, variable)
                .map_err(|e| DecodeError::for_variable(variable, e))?
            {
                decoded += 1;
            }
        }
        Ok(decoded)
    }
}

pub fn is_decoded(var: &Variable) -> bool {
    var.attrs
        .get(DECODED_FLAG)
        .and_then(AttrValue::as_bool)
        .unwrap_or(false)
}

pub fn decode_surface_precipitation(var: &mut Variable) {
    var.mask_values(|v| v == SURFACE_PRECIPITATION_SENTINEL);
}
