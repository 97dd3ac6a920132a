//! Deterministic JSON output for machine-readable reports.
//!
//! - 2-space indentation
//! - Trailing newline
//! - Field order follows the serialized types

mod json;

pub use json::*;
