//! CF-convention decoding seam and post-decode cleanup.
//!
//! Scale/offset/fill handling and time decoding belong to the reader that
//! produced the raw granule. The pipeline only calls it through [`CfDecode`]
//! and then drops the bookkeeping that decoding leaves behind.

use granule_model::Granule;
use tracing::debug;

use crate::attrs::{FILL_VALUE, SOURCE_DTYPE};
use crate::error::{BoxError, DecodeError, Result};

/// Compression filter settings that must not survive into re-encoding.
pub const FILTER_ENCODING_KEYS: [&str; 4] = ["szip", "zstd", "bzip2", "blosc"];

/// A CF decoding primitive.
pub trait CfDecode: Send + Sync {
    fn decode_cf(&self, granule: Granule) -> std::result::Result<Granule, BoxError>;
}

impl<F> CfDecode for F
where
    F: Fn(Granule) -> std::result::Result<Granule, BoxError> + Send + Sync,
{
    fn decode_cf(&self, granule: Granule) -> std::result::Result<Granule, BoxError> {
        self(granule)
    }
}

/// Decoder for granules whose values are already physical.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCf;

impl CfDecode for PassthroughCf {
    fn decode_cf(&self, granule: Granule) -> std::result::Result<Granule, BoxError> {
        Ok(granule)
    }
}

/// Run the CF decoder, then strip decode bookkeeping from every data variable.
pub fn decode_and_clean(granule: Granule, decoder: &dyn CfDecode) -> Result<Granule> {
    let mut granule = decoder.decode_cf(granule).map_err(DecodeError::CfDecode)?;
    let stripped = strip_decode_bookkeeping(&mut granule);
    debug!(stripped = stripped, "CF decoding complete");
    Ok(granule)
}

/// Remove `source_dtype` / `_FillValue` attributes and compression filter
/// encodings. Returns the number of entries removed.
pub fn strip_decode_bookkeeping(granule: &mut Granule) -> usize {
    let mut removed = 0;
    for (_, var) in granule.data_vars_mut() {
        for key in [SOURCE_DTYPE, FILL_VALUE] {
            removed += usize::from(var.attrs.remove(key).is_some());
        }
        for key in FILTER_ENCODING_KEYS {
            removed += usize::from(var.encoding.remove(key).is_some());
        }
    }
    removed
}
