//! Shared test utilities for the gpm-decode workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic swath granule builders
//! - Product / scan mode fixtures
//! - Config and granule file helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{SwathBuilder, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that a slice holds exactly the expected values, treating NaN as
/// equal to NaN.
///
/// ```ignore
/// use test_utils::assert_values_eq;
///
/// assert_values_eq!(var.values().unwrap(), [1.0, f64::NAN]);
/// ```
#[macro_export]
macro_rules! assert_values_eq {
    ($actual:expr, $expected:expr) => {{
        let actual: &[f64] = &$actual;
        let expected: &[f64] = &$expected;
        let same = actual.len() == expected.len()
            && actual
                .iter()
                .zip(expected)
                .all(|(a, e)| (a.is_nan() && e.is_nan()) || a == e);
        if !same {
            panic!(
                "assertion failed: values differ\n  actual: `{:?}`,\nexpected: `{:?}`",
                actual, expected
            );
        }
    }};
}
