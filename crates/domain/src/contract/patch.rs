//! Partial-update payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FieldPath;
use crate::booking::BookingDates;
use crate::error::DomainResult;

/// The subset of booking fields submitted by a partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingPatch {
    fields: Vec<(FieldPath, Value)>,
}

impl BookingPatch {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds an arbitrary field by dotted path (builder pattern).
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid field path.
    pub fn with(self, path: &str, value: Value) -> DomainResult<Self> {
        Ok(self.set(FieldPath::parse(path)?, value))
    }

    /// Patches the first name.
    #[must_use]
    pub fn first_name(self, value: impl Into<String>) -> Self {
        self.set(FieldPath::known("firstname"), Value::from(value.into()))
    }

    /// Patches the last name.
    #[must_use]
    pub fn last_name(self, value: impl Into<String>) -> Self {
        self.set(FieldPath::known("lastname"), Value::from(value.into()))
    }

    /// Patches the total price.
    #[must_use]
    pub fn total_price(self, value: u32) -> Self {
        self.set(FieldPath::known("totalprice"), Value::from(value))
    }

    /// Patches the deposit flag.
    #[must_use]
    pub fn deposit_paid(self, value: bool) -> Self {
        self.set(FieldPath::known("depositpaid"), Value::from(value))
    }

    /// Patches both stay dates.
    #[must_use]
    pub fn dates(self, dates: BookingDates) -> Self {
        self.set(
            FieldPath::known("bookingdates.checkin"),
            Value::from(dates.check_in().to_string()),
        )
        .set(
            FieldPath::known("bookingdates.checkout"),
            Value::from(dates.check_out().to_string()),
        )
    }

    /// Patches the additional needs.
    #[must_use]
    pub fn additional_needs(self, value: impl Into<String>) -> Self {
        self.set(FieldPath::known("additionalneeds"), Value::from(value.into()))
    }

    fn set(mut self, path: FieldPath, value: Value) -> Self {
        match self.fields.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((path, value)),
        }
        self
    }

    /// Iterates over patched fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &Value)> {
        self.fields.iter().map(|(path, value)| (path, value))
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the patch as the nested JSON request body.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = Value::Object(serde_json::Map::new());
        for (path, value) in &self.fields {
            path.insert(&mut body, value.clone());
        }
        body
    }
}
