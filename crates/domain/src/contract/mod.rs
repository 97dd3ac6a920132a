//! Contract value types
//!
//! Describes what the server is expected to return and how a single field
//! deviated from it.

mod expected;
mod field_path;
mod patch;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use expected::ExpectedState;
pub use field_path::FieldPath;
pub use patch::BookingPatch;

/// One field whose observed value differs from the expected one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMismatch {
    /// Path of the drifted field.
    pub field: FieldPath,
    /// Value the contract requires.
    pub expected: Value,
    /// Value found in the response, `None` if the field was absent.
    pub actual: Option<Value>,
}

impl FieldMismatch {
    /// Creates a mismatch record.
    #[must_use]
    pub const fn new(field: FieldPath, expected: Value, actual: Option<Value>) -> Self {
        Self {
            field,
            expected,
            actual,
        }
    }
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: expected {}, got {}",
                self.field, self.expected, actual
            ),
            None => write!(f, "{}: expected {}, field missing", self.field, self.expected),
        }
    }
}

/// Compares two JSON values with JSON number semantics (`125 == 125.0`).
#[must_use]
pub fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(e), Value::Number(a)) => match (e.as_f64(), a.as_f64()) {
            (Some(e), Some(a)) => (e - a).abs() < f64::EPSILON,
            _ => e == a,
        },
        _ => expected == actual,
    }
}
