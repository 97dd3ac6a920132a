//! Contract verifier.
//!
//! Judges responses against the booking contract. Status checks are
//! fail-fast; field checks come in two flavours: whole-object equality that
//! reports the first differing field, and aggregated checks that evaluate
//! every expected field before reporting.

use bookcheck_domain::contract::values_match;
use bookcheck_domain::{
    Booking, BookingId, BookingRecord, ExpectedState, FieldMismatch, HttpMethod, ResponseSpec,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{ContractError, ContractResult};

/// Body the service answers a successful deletion with.
pub const DELETED_MARKER: &str = "Created";
/// Body the service answers a read of a missing booking with.
pub const ABSENT_MARKER: &str = "Not Found";

/// Stateless checker for booking responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContractVerifier;

impl ContractVerifier {
    /// Create a new verifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Requires an exact status code.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::StatusMismatch`] if the status differs.
    pub fn verify_status(&self, response: &ResponseSpec, expected: u16) -> ContractResult<()> {
        if response.status == expected {
            return Ok(());
        }
        warn!(expected, actual = response.status, "status mismatch");
        Err(ContractError::StatusMismatch {
            expected,
            actual: response.status,
            body: response.body.clone(),
        })
    }

    /// Requires the echoed booking to equal the submitted one, dates included.
    ///
    /// The echo is compared as JSON, leaf by leaf, so a missing or
    /// wrongly typed field is reported like any other difference.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::FieldMismatch`] naming the first differing
    /// field in wire order.
    pub fn verify_resource_equality(&self, actual: &Value, expected: &Booking) -> ContractResult<()> {
        let first = expected
            .leaf_values()
            .into_iter()
            .find_map(|(field, want)| match field.lookup(actual) {
                Some(got) if values_match(&want, got) => None,
                None if want.is_null() => None,
                got => {
                    let got = got.filter(|value| !value.is_null()).cloned();
                    Some(FieldMismatch::new(field, want, got))
                }
            });
        match first {
            None => Ok(()),
            Some(mismatch) => {
                warn!(%mismatch, "echoed booking differs");
                Err(ContractError::FieldMismatch(mismatch))
            }
        }
    }

    /// Checks a creation response body: a numeric `bookingid` plus a
    /// `booking` equal to the submitted one.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MalformedBody`] without a usable
    /// `bookingid`, and [`ContractError::FieldMismatch`] if the echo differs.
    pub fn verify_created(&self, body: &Value, expected: &Booking) -> ContractResult<BookingRecord> {
        let id = body
            .get("bookingid")
            .and_then(Value::as_u64)
            .map(BookingId)
            .ok_or_else(|| {
                warn!(%body, "creation response lacks a booking id");
                ContractError::MalformedBody(format!("no numeric bookingid in {body}"))
            })?;
        self.verify_resource_equality(body.get("booking").unwrap_or(&Value::Null), expected)?;
        Ok(BookingRecord {
            id,
            booking: expected.clone(),
        })
    }

    /// Evaluates every expected field against a response body and returns
    /// all mismatches. An empty vector means the body satisfies `expected`.
    #[must_use]
    pub fn verify_fields_aggregated(
        &self,
        actual_body: &Value,
        expected: &ExpectedState,
    ) -> Vec<FieldMismatch> {
        let mismatches: Vec<FieldMismatch> = expected
            .iter()
            .filter_map(|(field, want)| match field.lookup(actual_body) {
                Some(got) if values_match(want, got) => None,
                None if want.is_null() => None,
                got => Some(FieldMismatch::new(field.clone(), want.clone(), got.cloned())),
            })
            .collect();
        for mismatch in &mismatches {
            warn!(%mismatch, "field drifted");
        }
        mismatches
    }

    /// Like [`Self::verify_fields_aggregated`], but as a result.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::FieldMismatches`] with every drifted field.
    pub fn require_fields(&self, actual_body: &Value, expected: &ExpectedState) -> ContractResult<()> {
        let mismatches = self.verify_fields_aggregated(actual_body, expected);
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(ContractError::FieldMismatches(mismatches))
        }
    }

    /// Requires a deletion to answer `201` with body `Created`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::DeletionFailure`] otherwise.
    pub fn verify_deleted(&self, response: &ResponseSpec) -> ContractResult<()> {
        if response.status == 201 && response.body_text() == DELETED_MARKER {
            return Ok(());
        }
        warn!(status = response.status, body = %response.body, "deletion not acknowledged");
        Err(ContractError::DeletionFailure {
            status: response.status,
            body: response.body.clone(),
        })
    }

    /// Requires a read to answer `404` with body `Not Found`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnexpectedPresence`] otherwise.
    pub fn verify_absence(&self, response: &ResponseSpec) -> ContractResult<()> {
        if response.status == 404 && response.body_text() == ABSENT_MARKER {
            return Ok(());
        }
        warn!(status = response.status, body = %response.body, "booking not absent");
        Err(ContractError::UnexpectedPresence {
            status: response.status,
            body: response.body.clone(),
        })
    }

    /// Requires a mutation sent without credentials to be refused.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnauthenticatedMutationAccepted`] on any 2xx.
    pub fn verify_rejected(&self, method: HttpMethod, response: &ResponseSpec) -> ContractResult<()> {
        if !response.is_success() {
            return Ok(());
        }
        warn!(%method, status = response.status, "anonymous mutation accepted");
        Err(ContractError::UnauthenticatedMutationAccepted {
            method,
            status: response.status,
        })
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MalformedBody`] if the body is not JSON.
    pub fn json_body(&self, response: &ResponseSpec) -> ContractResult<Value> {
        serde_json::from_str(&response.body).map_err(|e| malformed(response, &e))
    }

    /// Decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MalformedBody`] if the body does not decode.
    pub fn decode<T: DeserializeOwned>(&self, response: &ResponseSpec) -> ContractResult<T> {
        serde_json::from_str(&response.body).map_err(|e| malformed(response, &e))
    }
}

fn malformed(response: &ResponseSpec, error: &serde_json::Error) -> ContractError {
    warn!(body = %response.body, %error, "undecodable body");
    ContractError::MalformedBody(format!("{error} in {:?}", response.body))
}
