//! Session manager
//!
//! The single source of truth for the signed-in identity and the selected
//! server. Every operation reads or writes the [`SessionStore`], recomputes the
//! [`AuthState`] and publishes it once the operation has fully resolved.
//!
//! Failures never leave the published state half-updated. A refresh that
//! cannot read the store publishes the logged-out state (fail closed).
//!
//! # Example
//!
//! ```rust,no_run
//! use app_state::{SessionConfig, SessionManager};
//! use networking::SimulatedAuthBackend;
//! use std::sync::Arc;
//! use storage::{KvSessionStore, KvStore, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let kv = Arc::new(KvStore::in_memory()?);
//!     let manager = SessionManager::new(
//!         Arc::new(KvSessionStore::new(kv)),
//!         Arc::new(SimulatedAuthBackend::default()),
//!         SessionConfig::default(),
//!     )
//!     .await;
//!
//!     manager
//!         .add_server(ServerConfig::new("srv1", "Depot", "https://depot.example.com").active())
//!         .await?;
//!     let user = manager.login("alice", "secret").await?;
//!     println!("Signed in as {}", user.username);
//!
//!     manager.logout().await?;
//!     Ok(())
//! }
//! ```

use networking::{AuthBackend, BackendError, Credentials};
use serde::Serialize;
use std::sync::Arc;
use storage::{ServerConfig, SessionStore, StoreError, UserAuth};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::auth_state::AuthState;
use crate::config::SessionConfig;

/// Session operation errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login attempted with no server selected
    #[error("No active server selected")]
    NoActiveServer,

    /// Username or password blank
    #[error("Username and password are required")]
    InvalidCredentials,

    /// Server id not in the configured list
    #[error("Server not found: {0}")]
    UnknownServer(String),

    /// Server entry cannot be stored
    #[error("Invalid server: {0}")]
    InvalidServer(String),

    /// Persistent store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Login round-trip failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Stable reason code for a failed session operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// See [`SessionError::NoActiveServer`]
    NoActiveServer,
    /// See [`SessionError::InvalidCredentials`]
    InvalidCredentials,
    /// See [`SessionError::UnknownServer`]
    UnknownServer,
    /// See [`SessionError::InvalidServer`]
    InvalidServer,
    /// See [`SessionError::Storage`]
    Storage,
    /// See [`SessionError::Backend`]
    Backend,
}

impl SessionError {
    /// Reason code for UI mapping
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::NoActiveServer => FailureReason::NoActiveServer,
            Self::InvalidCredentials => FailureReason::InvalidCredentials,
            Self::UnknownServer(_) => FailureReason::UnknownServer,
            Self::InvalidServer(_) => FailureReason::InvalidServer,
            Self::Storage(_) => FailureReason::Storage,
            Self::Backend(_) => FailureReason::Backend,
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Session manager
///
/// Construct once at startup and share as `Arc<SessionManager>`. Operations
/// take `&self`; concurrent mutating calls are not serialized, so callers
/// should not issue a second login or logout while one is in flight.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn AuthBackend>,
    state: watch::Sender<AuthState>,
}

impl SessionManager {
    /// Create a session manager and replay the persisted session
    ///
    /// The initial state is logged out. If `config.refresh_on_start` is set the
    /// persisted records are read before this returns; a read failure is logged
    /// and leaves the state logged out.
    pub async fn new(
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn AuthBackend>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        let manager = Self { store, backend, state };

        if config.refresh_on_start {
            if let Err(e) = manager.refresh_auth_state().await {
                tracing::debug!(error = %e, "starting logged out");
            }
        }

        manager
    }

    /// Current state
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Watch for state changes
    ///
    /// The receiver is notified every time an operation publishes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Reload the persisted records and recompute the state
    ///
    /// On a storage failure the logged-out state is published and the error is
    /// returned; the published state is always complete.
    pub async fn refresh_auth_state(&self) -> Result<AuthState> {
        match self.load_state().await {
            Ok(state) => {
                tracing::debug!(
                    authenticated = state.is_authenticated,
                    active_server = state.active_server.as_ref().map(|s| s.id.as_str()),
                    "refreshed auth state"
                );
                self.state.send_replace(state.clone());
                Ok(state)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session store, treating as logged out");
                self.state.send_replace(AuthState::default());
                Err(e.into())
            }
        }
    }

    /// Log in against the active server
    ///
    /// Requires an active server in the current state. The round-trip to the
    /// server happens before the credentials are checked; both must be
    /// non-blank after trimming. On success the new identity is persisted,
    /// first-time setup is marked complete, and the state becomes logged in.
    /// On any failure the state is left unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserAuth> {
        let Some(server) = self.snapshot().active_server else {
            tracing::warn!("login attempted without an active server");
            return Err(SessionError::NoActiveServer);
        };

        let credentials = Credentials::new(username, password);

        if let Err(e) = self.backend.authenticate(&server, &credentials).await {
            tracing::warn!(server_id = %server.id, error = %e, "login round-trip failed");
            return Err(e.into());
        }

        if !credentials.is_complete() {
            tracing::warn!(server_id = %server.id, "login rejected: blank credentials");
            return Err(SessionError::InvalidCredentials);
        }

        let user = UserAuth::logged_in(
            Uuid::new_v4().to_string(),
            credentials.username(),
            server.id.as_str(),
        );

        if let Err(e) = self.persist_login(&user).await {
            tracing::warn!(error = %e, "failed to persist login");
            return Err(e.into());
        }

        self.state.send_modify(|state| {
            state.is_authenticated = true;
            state.user = Some(user.clone());
        });

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            server_id = %server.id,
            "logged in"
        );

        Ok(user)
    }

    /// Log out
    ///
    /// The in-memory identity is always cleared, even if clearing the persisted
    /// record fails; that failure is logged and returned. The server selection
    /// is kept.
    pub async fn logout(&self) -> Result<()> {
        let cleared = self.store.clear_user_auth().await;

        self.state.send_modify(AuthState::clear_identity);

        match cleared {
            Ok(()) => {
                tracing::info!("logged out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear persisted user auth during logout");
                Err(e.into())
            }
        }
    }

    /// Whether first-time setup is still pending
    pub async fn is_first_run(&self) -> Result<bool> {
        Ok(self.store.is_first_run().await?)
    }

    /// Configured servers in stored order
    pub async fn servers(&self) -> Result<Vec<ServerConfig>> {
        Ok(self.store.load_servers().await?)
    }

    /// Add a server, or replace the entry with the same id in place
    ///
    /// Adding an active entry deactivates every other entry.
    pub async fn add_server(&self, server: ServerConfig) -> Result<AuthState> {
        if server.id.trim().is_empty() {
            return Err(SessionError::InvalidServer("server id is empty".to_string()));
        }

        let mut servers = self.store.load_servers().await?;

        if server.is_active {
            for existing in &mut servers {
                existing.is_active = false;
            }
        }

        tracing::info!(server_id = %server.id, active = server.is_active, "adding server");

        match servers.iter_mut().find(|s| s.id == server.id) {
            Some(existing) => *existing = server,
            None => servers.push(server),
        }

        self.store.save_servers(&servers).await?;
        self.refresh_auth_state().await
    }

    /// Make `id` the only active server
    pub async fn select_server(&self, id: &str) -> Result<ServerConfig> {
        let mut servers = self.store.load_servers().await?;

        if !servers.iter().any(|s| s.id == id) {
            return Err(SessionError::UnknownServer(id.to_string()));
        }

        for server in &mut servers {
            server.is_active = server.id == id;
        }

        self.store.save_servers(&servers).await?;
        tracing::info!(server_id = %id, "selected server");

        let state = self.refresh_auth_state().await?;
        state
            .active_server
            .ok_or_else(|| SessionError::UnknownServer(id.to_string()))
    }

    /// Remove a server
    ///
    /// Removing the last server drops authentication on the next refresh.
    pub async fn remove_server(&self, id: &str) -> Result<AuthState> {
        let mut servers = self.store.load_servers().await?;

        let index = servers
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SessionError::UnknownServer(id.to_string()))?;

        servers.remove(index);
        self.store.save_servers(&servers).await?;
        tracing::info!(server_id = %id, remaining = servers.len(), "removed server");

        self.refresh_auth_state().await
    }

    async fn load_state(&self) -> std::result::Result<AuthState, StoreError> {
        let user = self.store.load_user_auth().await?;
        let servers = self.store.load_servers().await?;
        Ok(AuthState::derive(user, &servers))
    }

    /// Store `user` and clear the first-run flag, or store neither
    async fn persist_login(&self, user: &UserAuth) -> std::result::Result<(), StoreError> {
        let previous = self.store.load_user_auth().await?;
        self.store.save_user_auth(user).await?;

        if let Err(e) = self.store.set_first_run(false).await {
            if let Err(restore) = self.store.save_user_auth(&previous).await {
                tracing::warn!(error = %restore, "failed to restore previous user auth");
            }
            return Err(e);
        }

        Ok(())
    }
}
