//! Derived authentication state
//!
//! [`AuthState`] is never persisted. It is recomputed from the stored
//! [`UserAuth`] and server list on every refresh.

use serde::Serialize;
use storage::{ServerConfig, UserAuth};

/// Coarse session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No authenticated user
    LoggedOut,
    /// A user is authenticated against a configured server
    LoggedIn,
}

/// Snapshot of "is the user authenticated, as whom, against which server"
///
/// `AuthState::default()` is the fail-closed state: not authenticated, no
/// user, no active server.
///
/// # Example
///
/// ```rust
/// use app_state::{AuthState, SessionPhase};
/// use storage::{ServerConfig, UserAuth};
///
/// let servers = vec![ServerConfig::new("srv1", "Depot", "https://depot.example.com").active()];
/// let state = AuthState::derive(UserAuth::logged_in("u-1", "alice", "srv1"), &servers);
///
/// assert!(state.is_authenticated);
/// assert_eq!(state.phase(), SessionPhase::LoggedIn);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    /// True iff the stored user is logged in and at least one server exists
    pub is_authenticated: bool,
    /// Stored user, present only while the record is marked logged in
    pub user: Option<UserAuth>,
    /// First server flagged active, if any
    pub active_server: Option<ServerConfig>,
}

impl AuthState {
    /// Recompute the state from persisted records
    pub fn derive(user: UserAuth, servers: &[ServerConfig]) -> Self {
        let logged_in = user.is_logged_in;

        Self {
            is_authenticated: logged_in && !servers.is_empty(),
            user: if logged_in { Some(user) } else { None },
            active_server: servers.iter().find(|s| s.is_active).cloned(),
        }
    }

    /// Current phase of the session state machine
    pub fn phase(&self) -> SessionPhase {
        if self.is_authenticated && self.user.is_some() {
            SessionPhase::LoggedIn
        } else {
            SessionPhase::LoggedOut
        }
    }

    /// Username of the authenticated user
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// Drop the identity but keep the server selection
    pub(crate) fn clear_identity(&mut self) {
        self.is_authenticated = false;
        self.user = None;
    }
}
