//! Expected resource state for field-level verification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BookingPatch, FieldPath};
use crate::booking::Booking;
use crate::error::{DomainError, DomainResult};

/// Ordered mapping from field path to the value the server must report.
///
/// Built fresh for every verification step. Entries keep insertion order so
/// reports list fields the way the resource declares them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedState {
    fields: Vec<(FieldPath, Value)>,
}

impl ExpectedState {
    /// Expects every field of `booking`. Unset additional needs are
    /// expected as `null`, which an absent field also satisfies.
    #[must_use]
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            fields: booking.leaf_values(),
        }
    }

    /// Expects `prior` with `patch` applied on top: patched leaves take the
    /// new value, every other field keeps its prior value.
    #[must_use]
    pub fn merged(prior: &Booking, patch: &BookingPatch) -> Self {
        let mut state = Self::from_booking(prior);
        for (path, value) in patch.iter() {
            state.set_flattened(path.clone(), value.clone());
        }
        state
    }

    /// Sets (or overrides) a single expected field.
    fn set(&mut self, path: FieldPath, value: Value) {
        match self.fields.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((path, value)),
        }
    }

    /// Sets a field, expanding non-empty objects into their leaves.
    fn set_flattened(&mut self, path: FieldPath, value: Value) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, nested) in map {
                    self.set_flattened(path.child(&key), nested);
                }
            }
            other => self.set(path, other),
        }
    }

    /// Builds the booking this expectation describes. `null` leaves stay
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBooking`] if the expected fields do not
    /// form a booking, such as a patch giving `totalprice` a string.
    pub fn to_booking(&self) -> DomainResult<Booking> {
        let mut body = Value::Object(Map::new());
        for (path, value) in self.iter().filter(|(_, value)| !value.is_null()) {
            path.insert(&mut body, value.clone());
        }
        serde_json::from_value(body).map_err(|e| DomainError::InvalidBooking(e.to_string()))
    }

    /// Returns the expected value for a path.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, value)| value)
    }

    /// Iterates over expected fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &Value)> {
        self.fields.iter().map(|(path, value)| (path, value))
    }

    /// Number of expected fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if nothing is expected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
