//! Bookcheck Domain - Core contract types
//!
//! This crate defines the booking resource model and the value types used
//! to describe expected server state. All types here are pure Rust with no
//! I/O dependencies.

pub mod auth;
pub mod booking;
pub mod contract;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{AuthConfig, Credentials};
pub use booking::{Booking, BookingDates, BookingId, BookingRecord, BookingRef};
pub use contract::{BookingPatch, ExpectedState, FieldMismatch, FieldPath};
pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, RequestBody, RequestSpec};
pub use response::{ResponseSpec, StatusCode};
