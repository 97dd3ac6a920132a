//! Domain error types

use chrono::NaiveDate;
use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A stay must check out strictly after it checks in.
    #[error("invalid date range: check-in {check_in} is not before check-out {check_out}")]
    InvalidDateRange {
        /// Requested check-in date.
        check_in: NaiveDate,
        /// Requested check-out date.
        check_out: NaiveDate,
    },

    /// A date is not in `YYYY-MM-DD` form.
    #[error("invalid date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// A set of fields does not describe a booking.
    #[error("not a booking: {0}")]
    InvalidBooking(String),

    /// A field path is empty or contains an empty segment.
    #[error("invalid field path: '{0}'")]
    InvalidFieldPath(String),

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
