//! Application error types

use bookcheck_domain::{BookingId, DomainError, FieldMismatch, HttpMethod};
use thiserror::Error;

use crate::lifecycle::{LifecycleOp, LifecycleState};
use crate::ports::HttpClientError;

/// A broken contract, or a failure that prevented checking it.
#[derive(Debug, Clone, Error)]
pub enum ContractError {
    /// The response status differs from the one the operation requires.
    #[error("expected status {expected}, got {actual}")]
    StatusMismatch {
        /// Status the contract requires.
        expected: u16,
        /// Status observed.
        actual: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// The first field that differs in a whole-object comparison.
    #[error("field mismatch: {0}")]
    FieldMismatch(FieldMismatch),

    /// Every drifted field of an aggregated comparison.
    #[error("{} field(s) drifted: {}", .0.len(), join_mismatches(.0))]
    FieldMismatches(Vec<FieldMismatch>),

    /// Deletion did not answer `201 Created`.
    #[error("deletion failed: expected 201 \"Created\", got {status} {body:?}")]
    DeletionFailure {
        /// Status observed.
        status: u16,
        /// Body observed.
        body: String,
    },

    /// A deleted booking can still be read.
    #[error("booking {id} is still retrievable after deletion")]
    StaleRecord {
        /// Identifier of the deleted booking.
        id: BookingId,
    },

    /// A read of a deleted booking did not answer `404 Not Found`.
    #[error("expected 404 \"Not Found\", got {status} {body:?}")]
    UnexpectedPresence {
        /// Status observed.
        status: u16,
        /// Body observed.
        body: String,
    },

    /// The listing returned no identifiers.
    #[error("booking listing is empty")]
    EmptyListing,

    /// A mutation sent without credentials was accepted.
    #[error("{method} without credentials was accepted with status {status}")]
    UnauthenticatedMutationAccepted {
        /// Method of the mutation.
        method: HttpMethod,
        /// Status observed.
        status: u16,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("malformed response body: {0}")]
    MalformedBody(String),

    /// The operation is not allowed in the booking's current state.
    #[error("cannot {op} a booking in state {state}")]
    InvalidTransition {
        /// Requested operation.
        op: LifecycleOp,
        /// State the booking was in.
        state: LifecycleState,
    },

    /// The exchange itself failed.
    #[error("transport error: {0}")]
    Transport(#[from] HttpClientError),

    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ContractError {
    /// Field-level mismatches carried by this error, if any.
    #[must_use]
    pub fn mismatches(&self) -> &[FieldMismatch] {
        match self {
            Self::FieldMismatch(mismatch) => std::slice::from_ref(mismatch),
            Self::FieldMismatches(mismatches) => mismatches,
            _ => &[],
        }
    }

    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StatusMismatch { .. } => "status_mismatch",
            Self::FieldMismatch(_) => "field_mismatch",
            Self::FieldMismatches(_) => "field_mismatches",
            Self::DeletionFailure { .. } => "deletion_failure",
            Self::StaleRecord { .. } => "stale_record",
            Self::UnexpectedPresence { .. } => "unexpected_presence",
            Self::EmptyListing => "empty_listing",
            Self::UnauthenticatedMutationAccepted { .. } => "unauthenticated_mutation_accepted",
            Self::MalformedBody(_) => "malformed_body",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Transport(_) => "transport",
            Self::Domain(_) => "domain",
        }
    }
}

fn join_mismatches(mismatches: &[FieldMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for contract checks.
pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookcheck_domain::FieldPath;
    use serde_json::json;

    fn mismatch(path: &str, expected: serde_json::Value, actual: serde_json::Value) -> FieldMismatch {
        FieldMismatch::new(FieldPath::parse(path).unwrap(), expected, Some(actual))
    }

    #[test]
    fn test_aggregated_display_lists_every_field() {
        let error = ContractError::FieldMismatches(vec![
            mismatch("lastname", json!("Pruchkovskiy"), json!("X")),
            mismatch("totalprice", json!(150), json!(0)),
        ]);
        assert_eq!(
            error.to_string(),
            r#"2 field(s) drifted: lastname: expected "Pruchkovskiy", got "X"; totalprice: expected 150, got 0"#
        );
        assert_eq!(error.mismatches().len(), 2);
    }

    #[test]
    fn test_non_field_errors_carry_no_mismatches() {
        let error = ContractError::StaleRecord { id: BookingId(9) };
        assert!(error.mismatches().is_empty());
        assert_eq!(error.kind(), "stale_record");
        assert_eq!(
            error.to_string(),
            "booking 9 is still retrievable after deletion"
        );
    }

    #[test]
    fn test_transport_conversion() {
        let error: ContractError = HttpClientError::Timeout { timeout_ms: 50 }.into();
        assert_eq!(error.kind(), "transport");
        assert_eq!(error.to_string(), "transport error: request timed out after 50 ms");
    }
}
