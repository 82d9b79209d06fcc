//! Storage layer for Courier App
//!
//! This crate provides the on-device key-value store and the persisted
//! session records (signed-in identity, configured servers, first-run flag).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod records;
pub mod session_store;

pub use kv::{KvConfig, KvError, KvStore};
pub use records::{ServerConfig, UserAuth};
pub use session_store::{KvSessionStore, SessionStore, StoreError};
