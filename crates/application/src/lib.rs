//! Bookcheck Application - Contract verification and lifecycle orchestration
//!
//! This crate defines the application layer with:
//! - The `HttpClient` port (implemented by the infrastructure crate)
//! - The contract verifier and the lifecycle orchestrator
//! - Scenario entry points and the suite runner

pub mod booking_api;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod scenarios;
pub mod suite;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use booking_api::BookingApi;
pub use config::{ConfigError, SuiteConfig};
pub use error::{ContractError, ContractResult};
pub use lifecycle::{
    DeletedBooking, LifecycleOp, LifecycleOrchestrator, LifecycleState, TrackedBooking,
};
pub use ports::{HttpClient, HttpClientError};
pub use scenarios::Scenario;
pub use suite::{ContractSuite, Failure, ScenarioOutcome, SuiteReport};
pub use verifier::ContractVerifier;
