//! Geolocation range checks for swath granules.

use granule_model::{Granule, Mask};
use tracing::debug;

use crate::error::{DecodeError, Result};
use crate::warning::{Diagnostics, WarningKind};

pub const LON: &str = "lon";
pub const LAT: &str = "lat";
/// Dimension that marks a granule as an orbit swath.
pub const SWATH_DIM: &str = "cross_track";

pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

fn outside((lo, hi): (f64, f64)) -> impl Fn(f64) -> bool {
    move |v| v < lo || v > hi
}

/// Mask of samples whose longitude or latitude is out of range.
///
/// Returns `None` when the granule has neither coordinate. Missing values
/// are not flagged.
pub fn invalid_coordinate_mask(granule: &Granule) -> Result<Option<Mask>> {
    let lon = granule
        .variable(LON)
        .map(|v| Mask::from_variable(LON, v, outside(LON_RANGE)))
        .transpose()?;
    let lat = granule
        .variable(LAT)
        .map(|v| Mask::from_variable(LAT, v, outside(LAT_RANGE)))
        .transpose()?;

    Ok(match (lon, lat) {
        (Some(lon), Some(lat)) => Some(lon.or(&lat)?),
        (lon, lat) => lon.or(lat),
    })
}

/// Validate swath geolocation.
///
/// With `raise_on_invalid` set, any out-of-range sample fails the decode.
/// Otherwise one warning is recorded and every variable spanning the
/// geolocation dimensions is masked at the offending positions. Returns the
/// number of invalid samples.
pub fn ensure_valid_coords(
    granule: &mut Granule,
    raise_on_invalid: bool,
    diagnostics: &mut Diagnostics,
) -> Result<usize> {
    let Some(mask) = invalid_coordinate_mask(granule)? else {
        debug!("No lon/lat in granule, skipping geolocation check");
        return Ok(0);
    };
    if !mask.any() {
        return Ok(0);
    }
    let invalid = mask.count();
    if raise_on_invalid {
        return Err(DecodeError::GranuleGeolocation {
            invalid_samples: invalid,
        });
    }

    let masked = granule.apply_mask(&mask);
    diagnostics.warn(
        WarningKind::InvalidCoordinates,
        invalid,
        format!(
            "Invalid coordinates in the granule: {} samples masked ({} values set missing)",
            invalid, masked
        ),
    );
    Ok(invalid)
}
