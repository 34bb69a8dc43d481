//! Path utilities for config tables and temporary granule files.

use std::path::{Path, PathBuf};

use granule_model::Granule;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the workspace `config/` directory holding the product tables.
pub fn workspace_config_dir() -> PathBuf {
    workspace_root().join("config")
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Creates a temporary directory with a specific prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Creates a config directory holding the given table files.
///
/// Pass `None` to leave a table out, so loaders fall back to the built-in copy.
pub fn temp_config_dir(products: Option<&str>, frequencies: Option<&str>) -> tempfile::TempDir {
    let dir = temp_test_dir_with_prefix("gpm_config_");
    if let Some(products) = products {
        std::fs::write(dir.path().join("products.yaml"), products)
            .expect("Failed to write products.yaml");
    }
    if let Some(frequencies) = frequencies {
        std::fs::write(dir.path().join("pmw_frequency.yaml"), frequencies)
            .expect("Failed to write pmw_frequency.yaml");
    }
    dir
}

/// Writes a granule as JSON into `dir` and returns the file path.
pub fn write_granule(dir: &Path, name: &str, granule: &Granule) -> PathBuf {
    let path = dir.join(name);
    let json = serde_json::to_string(granule).expect("Granule serializes to JSON");
    std::fs::write(&path, json).expect("Failed to write granule file");
    path
}
