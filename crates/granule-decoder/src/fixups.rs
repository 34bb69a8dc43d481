//! Product-specific derived variables and attribute corrections.

use granule_model::{Granule, GranuleError, Variable};
use product_catalog::ProductDescriptor;
use tracing::debug;

use crate::attrs::UNITS;
use crate::error::Result;
use crate::registry::SURFACE_PRECIPITATION_SENTINEL;

pub const PRECIP_WATER_INTEGRATED: &str = "precipWaterIntegrated";
pub const FLAG_BB: &str = "flagBB";
pub const SURFACE_PRECIPITATION: &str = "surfacePrecipitation";
pub const SUN_LOCAL_TIME: &str = "sunLocalTime";

const NANOSECONDS_PER_HOUR: f64 = 3600.0 * 1e9;

const FLAG_BB_DESCRIPTION: &str = "Flag for Bright Band:\n\
    0 : BB not detected\n\
    1 : Bright Band detected by Ku and DFRm\n\
    2 : Bright Band detected by Ku only\n\
    3 : Bright Band detected by DFRm only\n";

/// A fixup returns whether it changed the granule.
pub type Fixup = fn(&mut Granule, &ProductDescriptor) -> Result<bool>;

/// Fixups in application order.
pub static FIXUPS: &[(&str, Fixup)] = &[
    (PRECIP_WATER_INTEGRATED, split_precip_water_integrated),
    (FLAG_BB, describe_bright_band),
    (SURFACE_PRECIPITATION, mask_surface_precipitation),
    (SUN_LOCAL_TIME, sun_local_time_to_hours),
];

pub fn apply_fixups(granule: &mut Granule, descriptor: &ProductDescriptor) -> Result<usize> {
    let mut applied = 0;
    for (name, fixup) in FIXUPS {
        if fixup(granule, descriptor)? {
            debug!(fixup = *name, product = %descriptor.id, "Applied fixup");
            applied += 1;
        }
    }
    Ok(applied)
}

/// Split the liquid/solid pair along the trailing size-2 axis into
/// `_Liquid`, `_Solid` and their sum under the original name.
///
/// Only `(along_track, cross_track, phase)` variables are split, so a swath
/// that happens to be two samples wide is never mistaken for the pair axis.
pub fn split_precip_water_integrated(
    granule: &mut Granule,
    _descriptor: &ProductDescriptor,
) -> Result<bool> {
    let liquid_name = format!("{}_Liquid", PRECIP_WATER_INTEGRATED);
    let solid_name = format!("{}_Solid", PRECIP_WATER_INTEGRATED);
    if granule.contains_data_var(&liquid_name) || granule.contains_data_var(&solid_name) {
        return Ok(false);
    }
    let Some(var) = granule.data_var(PRECIP_WATER_INTEGRATED) else {
        return Ok(false);
    };
    if var.ndim() != 3 {
        return Ok(false);
    }
    let Some(phase_dim) = var.dims().last().cloned() else {
        return Ok(false);
    };
    if var.dim_size(&phase_dim) != Some(2) {
        return Ok(false);
    }

    let liquid = var.index_axis(&phase_dim, 0)?;
    let solid = var.index_axis(&phase_dim, 1)?;
    let total: Variable = liquid
        .zip_with(&solid, |l, s| l + s)
        .ok_or_else(|| GranuleError::NotAligned {
            left: liquid_name.clone(),
            right: solid_name.clone(),
        })?;

    granule.remove_data_var(PRECIP_WATER_INTEGRATED);
    granule.insert_data_var(liquid_name, liquid)?;
    granule.insert_data_var(solid_name, solid)?;
    granule.insert_data_var(PRECIP_WATER_INTEGRATED, total)?;
    Ok(true)
}

pub fn describe_bright_band(granule: &mut Granule, descriptor: &ProductDescriptor) -> Result<bool> {
    if descriptor.id != "2A-DPR" {
        return Ok(false);
    }
    let Some(var) = granule.data_var_mut(FLAG_BB) else {
        return Ok(false);
    };
    var.attrs
        .insert("description".to_string(), FLAG_BB_DESCRIPTION.into());
    Ok(true)
}

/// Mask the fixed sentinel regardless of the declared fill value.
pub fn mask_surface_precipitation(
    granule: &mut Granule,
    _descriptor: &ProductDescriptor,
) -> Result<bool> {
    let Some(var) = granule.data_var_mut(SURFACE_PRECIPITATION) else {
        return Ok(false);
    };
    Ok(var.mask_values(|v| v == SURFACE_PRECIPITATION_SENTINEL) > 0)
}

/// Convert local solar time from nanoseconds to hours.
pub fn sun_local_time_to_hours(granule: &mut Granule, _descriptor: &ProductDescriptor) -> Result<bool> {
    let Some(var) = granule.data_var_mut(SUN_LOCAL_TIME) else {
        return Ok(false);
    };
    let in_nanoseconds = var
        .attrs
        .get(UNITS)
        .and_then(|u| u.as_str())
        .is_some_and(|u| u == "nanoseconds");
    if !in_nanoseconds {
        return Ok(false);
    }
    var.map_values(|v| v / NANOSECONDS_PER_HOUR);
    var.attrs.insert(UNITS.to_string(), "hours".into());
    Ok(true)
}
