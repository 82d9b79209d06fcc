//! Application state management for Courier App
//!
//! This crate owns the session core: it reconciles the persisted identity and
//! server list into an [`AuthState`] and mediates login, logout and server
//! selection. UI code holds an `Arc<SessionManager>` and either polls
//! [`SessionManager::snapshot`] or watches [`SessionManager::subscribe`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth_state;
pub mod config;
pub mod session;

pub use auth_state::{AuthState, SessionPhase};
pub use config::SessionConfig;
pub use session::{FailureReason, SessionError, SessionManager};
