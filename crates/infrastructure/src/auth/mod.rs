//! Credential resolution.

mod basic;

pub use basic::resolve_auth;
