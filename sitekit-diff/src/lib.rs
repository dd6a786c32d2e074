//! # sitekit-diff
//!
//! Structural diff of two JSON settings payloads, with line-count
//! classification and display abbreviation for the validate report.
//!
//! Call [`compare`] to build a [`SettingDiff`](sitekit_core::SettingDiff) or
//! [`diff_json`] for the raw runs.

pub mod abbreviate;
pub mod json_diff;
pub mod report;

pub use json_diff::{canonical_json, diff_json};
pub use report::{classify, compare};
