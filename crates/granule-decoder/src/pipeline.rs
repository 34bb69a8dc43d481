//! The decoding pipeline: raw granule in, analysis-ready granule out.

use granule_model::Granule;
use product_catalog::{PmwFrequencyTable, ProductCatalog};
use tracing::{debug, info_span};

use crate::attrs;
use crate::cf::{self, CfDecode, PassthroughCf};
use crate::coords::{self, SynthesisContext};
use crate::error::{DecodeError, Result};
use crate::fixups;
use crate::registry::VariableDecoderRegistry;
use crate::validation::{self, SWATH_DIM};
use crate::warning::{DecodeWarning, Diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail instead of masking when geolocation is out of range.
    pub raise_on_invalid_coords: bool,
    /// Run CF decoding and bookkeeping cleanup first. Disable for granules
    /// that are already decoded.
    pub decode_cf: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            raise_on_invalid_coords: false,
            decode_cf: true,
        }
    }
}

/// A decoded granule and the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct DecodedGranule {
    pub granule: Granule,
    pub product: String,
    pub scan_mode: String,
    warnings: Vec<DecodeWarning>,
}

impl DecodedGranule {
    pub fn warnings(&self) -> impl Iterator<Item = &DecodeWarning> {
        self.warnings.iter()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_granule(self) -> Granule {
        self.granule
    }

    pub fn into_parts(self) -> (Granule, Vec<DecodeWarning>) {
        (self.granule, self.warnings)
    }
}

/// Decodes granules against a product catalog.
///
/// The decoder holds no per-granule state and can be shared across threads.
pub struct GranuleDecoder<'a> {
    catalog: &'a ProductCatalog,
    frequencies: &'a PmwFrequencyTable,
    registry: VariableDecoderRegistry,
    cf: Box<dyn CfDecode + 'a>,
}

impl<'a> GranuleDecoder<'a> {
    pub fn new(catalog: &'a ProductCatalog, frequencies: &'a PmwFrequencyTable) -> Self {
        Self {
            catalog,
            frequencies,
            registry: VariableDecoderRegistry::with_defaults(),
            cf: Box::new(PassthroughCf),
        }
    }

    /// Decoder over the process-wide catalog and frequency table.
    pub fn shared() -> Result<GranuleDecoder<'static>> {
        Ok(GranuleDecoder::new(
            ProductCatalog::shared()?,
            PmwFrequencyTable::shared()?,
        ))
    }

    pub fn with_cf_decoder(mut self, cf: impl CfDecode + 'a) -> Self {
        self.cf = Box::new(cf);
        self
    }

    pub fn with_registry(mut self, registry: VariableDecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn catalog(&self) -> &ProductCatalog {
        self.catalog
    }

    pub fn registry(&self) -> &VariableDecoderRegistry {
        &self.registry
    }

    /// Decode a raw granule of `product` / `scan_mode`.
    pub fn decode(
        &self,
        raw: Granule,
        product: &str,
        scan_mode: &str,
        options: &DecodeOptions,
    ) -> Result<DecodedGranule> {
        let span = info_span!("decode", product = product, scan_mode = scan_mode);
        let _guard = span.enter();

        self.run(raw, product, scan_mode, options)
            .map_err(|source| DecodeError::Context {
                product: product.to_string(),
                scan_mode: scan_mode.to_string(),
                source: Box::new(source),
            })
    }

    fn run(
        &self,
        raw: Granule,
        product: &str,
        scan_mode: &str,
        options: &DecodeOptions,
    ) -> Result<DecodedGranule> {
        let descriptor = self
            .catalog
            .get(product)
            .ok_or_else(|| DecodeError::UnknownProduct(product.to_string()))?;
        if !descriptor.has_scan_mode(scan_mode) {
            return Err(DecodeError::UnknownScanMode {
                product: product.to_string(),
                scan_mode: scan_mode.to_string(),
            });
        }
        raw.validate()?;

        let mut diagnostics = Diagnostics::new();
        let mut granule = if options.decode_cf {
            cf::decode_and_clean(raw, self.cf.as_ref())?
        } else {
            raw
        };

        attrs::normalize_granule(&mut granule, Some(product));

        if granule.has_dim(SWATH_DIM) {
            validation::ensure_valid_coords(
                &mut granule,
                options.raise_on_invalid_coords,
                &mut diagnostics,
            )?;
        }

        let ctx = SynthesisContext {
            descriptor,
            scan_mode,
            frequencies: self.frequencies,
        };
        let coordinates = coords::synthesize_coordinates(&mut granule, &ctx, &mut diagnostics)?;
        let decoded = self.registry.decode_product(&mut granule, descriptor)?;
        let fixed = fixups::apply_fixups(&mut granule, descriptor)?;

        debug!(
            coordinates = coordinates,
            decoded_variables = decoded,
            fixups = fixed,
            warnings = diagnostics.len(),
            "Granule decoded"
        );

        Ok(DecodedGranule {
            granule,
            product: product.to_string(),
            scan_mode: scan_mode.to_string(),
            warnings: diagnostics.into_vec(),
        })
    }
}

/// Decode a raw granule with the shared catalog and default options.
pub fn decode(
    raw: Granule,
    product: &str,
    scan_mode: &str,
    raise_on_invalid_coords: bool,
) -> Result<DecodedGranule> {
    let options = DecodeOptions {
        raise_on_invalid_coords,
        ..DecodeOptions::default()
    };
    GranuleDecoder::shared()?.decode(raw, product, scan_mode, &options)
}
