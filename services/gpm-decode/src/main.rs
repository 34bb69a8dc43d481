//! GPM granule decoder.
//!
//! Reads raw GPM/TRMM granules serialized as JSON, runs the product-aware
//! decoding pipeline on each of them in parallel and writes the decoded
//! granules plus a per-granule summary.

mod config;
mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use granule_decoder::{DecodeOptions, GranuleDecoder};
use granule_model::Granule;
use rayon::prelude::*;
use tracing::{debug, error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::Tables;
use report::GranuleSummary;

#[derive(Parser, Debug)]
#[command(name = "gpm-decode")]
#[command(about = "Decode raw GPM/TRMM granules into analysis-ready datasets")]
struct Args {
    /// Product identifier, e.g. 2A-DPR
    #[arg(short, long)]
    product: String,

    /// Scan mode, e.g. FS
    #[arg(short, long)]
    scan_mode: String,

    /// Fail granules with out-of-range geolocation instead of masking them
    #[arg(long)]
    strict: bool,

    /// Input granules are already CF-decoded
    #[arg(long)]
    no_cf: bool,

    /// Directory holding products.yaml / pmw_frequency.yaml
    #[arg(long, env = "CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Write decoded granules into this directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Raw granule JSON files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    info!(
        product = %args.product,
        scan_mode = %args.scan_mode,
        files = args.files.len(),
        "Starting GPM granule decoder"
    );

    let tables = Tables::load(args.config_dir.as_deref())?;
    tables
        .catalog
        .product_info(&args.product)
        .context("Cannot decode requested product")?;

    if let Some(output) = &args.output {
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    }

    let decoder = GranuleDecoder::new(&tables.catalog, &tables.frequencies);
    let options = DecodeOptions {
        raise_on_invalid_coords: args.strict,
        decode_cf: !args.no_cf,
    };
    let job = Job {
        decoder: &decoder,
        options,
        product: &args.product,
        scan_mode: &args.scan_mode,
        output: args.output.as_deref(),
    };

    let results: Vec<(&PathBuf, Result<GranuleSummary>)> = args
        .files
        .par_iter()
        .map(|path| (path, job.run(path)))
        .collect();

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(summary) => println!("{}", summary),
            Err(e) => {
                failed += 1;
                error!(file = ?path, error = %format!("{:#}", e), "Granule failed");
                println!("{} FAILED: {:#}", path.display(), e);
            }
        }
    }

    let warnings: usize = results
        .iter()
        .filter_map(|(_, r)| r.as_ref().ok())
        .map(|s| s.warnings.len())
        .sum();
    info!(
        granules = results.len(),
        failed = failed,
        warnings = warnings,
        "Decoding completed"
    );

    if failed > 0 {
        bail!("{} of {} granules failed to decode", failed, results.len());
    }
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    // Logs go to stderr; stdout carries the summaries.
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Everything needed to decode one file.
struct Job<'a> {
    decoder: &'a GranuleDecoder<'a>,
    options: DecodeOptions,
    product: &'a str,
    scan_mode: &'a str,
    output: Option<&'a Path>,
}

impl Job<'_> {
    fn run(&self, path: &Path) -> Result<GranuleSummary> {
        let raw = read_granule(path)?;
        let decoded = self
            .decoder
            .decode(raw, self.product, self.scan_mode, &self.options)?;

        // Already logged at warn level when raised.
        for warning in decoded.warnings() {
            debug!(file = ?path, kind = ?warning.kind, affected = warning.affected, "Granule warning");
        }

        let mut summary = GranuleSummary::new(path, &decoded);
        if let Some(dir) = self.output {
            let target = output_path(dir, path);
            let json = serde_json::to_string(&decoded.granule)?;
            fs::write(&target, json)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            summary.output = Some(target.display().to_string());
        }
        Ok(summary)
    }
}

fn read_granule(path: &Path) -> Result<Granule> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse granule JSON {}", path.display()))
}

/// `<dir>/<stem>.decoded.json`
fn output_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "granule".to_string());
    dir.join(format!("{}.decoded.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{create_reflectivity_profiles, temp_test_dir, write_granule, SwathBuilder};

    fn tables() -> Tables {
        Tables::load(Some(Path::new("/nonexistent-config"))).unwrap()
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "gpm-decode",
            "--product",
            "2A-DPR",
            "--scan-mode",
            "HS",
            "--strict",
            "a.json",
            "b.json",
        ])
        .unwrap();
        assert_eq!(args.product, "2A-DPR");
        assert!(args.strict);
        assert!(!args.no_cf);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_args_require_files() {
        assert!(Args::try_parse_from(["gpm-decode", "-p", "2A-DPR", "-s", "HS"]).is_err());
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/out"), Path::new("/in/2A.GPM.DPR.json")),
            PathBuf::from("/out/2A.GPM.DPR.decoded.json")
        );
    }

    #[test]
    fn test_job_writes_decoded_granule() {
        let input = temp_test_dir();
        let output = temp_test_dir();
        let raw = SwathBuilder::new(2, 2)
            .with_profile("zFactorFinal", "range", 88, create_reflectivity_profiles(2, 2, 88))
            .build();
        let path = write_granule(input.path(), "dpr.json", &raw);

        let tables = tables();
        let decoder = GranuleDecoder::new(&tables.catalog, &tables.frequencies);
        let job = Job {
            decoder: &decoder,
            options: DecodeOptions::default(),
            product: "2A-DPR",
            scan_mode: "HS",
            output: Some(output.path()),
        };
        let summary = job.run(&path).unwrap();

        assert!(summary.coordinates.contains(&"range".to_string()));
        let written = summary.output.unwrap();
        let decoded: Granule = serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(decoded.coord("range").unwrap().values().unwrap()[87], 21750.0);
    }

    #[test]
    fn test_job_reports_bad_json() {
        let input = temp_test_dir();
        let path = input.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let tables = tables();
        let decoder = GranuleDecoder::new(&tables.catalog, &tables.frequencies);
        let job = Job {
            decoder: &decoder,
            options: DecodeOptions::default(),
            product: "2A-DPR",
            scan_mode: "HS",
            output: None,
        };
        let err = job.run(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse granule JSON"));
    }
}
