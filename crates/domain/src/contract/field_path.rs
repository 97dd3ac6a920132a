//! Dotted paths into JSON bodies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Address of a (possibly nested) field in a JSON object, such as
/// `firstname` or `bookingdates.checkin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidFieldPath`] if the path is empty or has
    /// an empty segment (`a..b`, `.a`, `a.`).
    pub fn parse(path: &str) -> DomainResult<Self> {
        let trimmed = path.trim();
        let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
        if trimmed.is_empty() || segments.iter().any(String::is_empty) {
            return Err(DomainError::InvalidFieldPath(path.to_string()));
        }
        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Builds a path from a literal known to be well formed.
    pub(crate) fn known(path: &'static str) -> Self {
        Self {
            raw: path.to_string(),
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the dotted form of the path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Appends a segment, returning the longer path.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self {
            raw: format!("{}.{segment}", self.raw),
            segments,
        }
    }

    /// Looks the field up in `json`. Returns `None` if any segment is
    /// missing or traverses a non-object.
    #[must_use]
    pub fn lookup<'a>(&self, json: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(json, |current, segment| current.get(segment.as_str()))
    }

    /// Writes `value` at this path, creating intermediate objects.
    /// Non-object intermediates are replaced by objects.
    pub fn insert(&self, target: &mut Value, value: Value) {
        insert_at(target, &self.segments, value);
    }
}

fn insert_at(target: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let slot = map.entry(head.clone()).or_insert(Value::Null);
        insert_at(slot, rest, value);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for FieldPath {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}
