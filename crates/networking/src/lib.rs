//! Networking for Courier App
//!
//! This crate provides the authentication round-trip to a configured
//! delivery server. The round-trip is currently simulated with a bounded
//! delay; callers depend only on the [`AuthBackend`] trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;

pub use auth::{AuthBackend, BackendError, Credentials, SimulatedAuthBackend, SimulatedBackendConfig};
