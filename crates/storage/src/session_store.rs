//! Persistent session store
//!
//! The session layer talks to storage only through [`SessionStore`]. The
//! production implementation, [`KvSessionStore`], keeps every record as a JSON
//! value in the sled-backed [`KvStore`]. Sled reads, writes and flushes run on
//! the blocking pool so the calling task yields while they complete.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::kv::{KvError, KvStore};
use crate::records::{ServerConfig, UserAuth};

const SESSION_SCOPE: &str = "session";
const DEVICE_SCOPE: &str = "device";
const USER_AUTH_KEY: &str = "user_auth";
const SERVERS_KEY: &str = "servers";
const FIRST_RUN_KEY: &str = "first_run";

/// Session store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying key-value store failed
    #[error("Key-value store error: {0}")]
    Kv(#[from] KvError),

    /// Storage task did not complete (panicked or was cancelled)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for session store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Read/write access to the persisted session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted identity, or the logged-out default if none is stored
    async fn load_user_auth(&self) -> Result<UserAuth>;

    /// Overwrite the persisted identity
    async fn save_user_auth(&self, auth: &UserAuth) -> Result<()>;

    /// Reset the persisted identity to the logged-out default
    async fn clear_user_auth(&self) -> Result<()>;

    /// Load all configured servers in their stored order
    async fn load_servers(&self) -> Result<Vec<ServerConfig>>;

    /// Replace the configured server list
    async fn save_servers(&self, servers: &[ServerConfig]) -> Result<()>;

    /// Whether first-time setup is still pending (true when never set)
    async fn is_first_run(&self) -> Result<bool>;

    /// Set the first-time setup flag
    async fn set_first_run(&self, first_run: bool) -> Result<()>;
}

/// [`SessionStore`] backed by the sled key-value store
#[derive(Clone)]
pub struct KvSessionStore {
    kv: Arc<KvStore>,
}

impl KvSessionStore {
    /// Create a session store over an opened key-value store
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Run `op` against the key-value store on the blocking pool
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&KvStore) -> std::result::Result<T, KvError> + Send + 'static,
    {
        let kv = Arc::clone(&self.kv);
        tokio::task::spawn_blocking(move || op(&kv))
            .await
            .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
            .map_err(StoreError::from)
    }

    /// Write a value under `scope:key` and flush it to disk
    async fn write<T>(&self, scope: &'static str, key: &'static str, value: T) -> Result<()>
    where
        T: serde::Serialize + Send + 'static,
    {
        self.blocking(move |kv| {
            kv.set_scoped(&[scope, key], &value)?;
            kv.flush()
        })
        .await
    }
}

#[async_trait]
impl SessionStore for KvSessionStore {
    async fn load_user_auth(&self) -> Result<UserAuth> {
        let auth: Option<UserAuth> = self
            .blocking(|kv| kv.get_scoped(&[SESSION_SCOPE, USER_AUTH_KEY]))
            .await?;
        tracing::debug!(found = auth.is_some(), "loaded user auth");
        Ok(auth.unwrap_or_default())
    }

    async fn save_user_auth(&self, auth: &UserAuth) -> Result<()> {
        tracing::debug!(user_id = %auth.user_id, "saving user auth");
        self.write(SESSION_SCOPE, USER_AUTH_KEY, auth.clone()).await
    }

    async fn clear_user_auth(&self) -> Result<()> {
        tracing::debug!("clearing user auth");
        self.write(SESSION_SCOPE, USER_AUTH_KEY, UserAuth::default())
            .await
    }

    async fn load_servers(&self) -> Result<Vec<ServerConfig>> {
        let servers: Option<Vec<ServerConfig>> = self
            .blocking(|kv| kv.get_scoped(&[SESSION_SCOPE, SERVERS_KEY]))
            .await?;
        let servers = servers.unwrap_or_default();
        tracing::debug!(count = servers.len(), "loaded servers");
        Ok(servers)
    }

    async fn save_servers(&self, servers: &[ServerConfig]) -> Result<()> {
        tracing::debug!(count = servers.len(), "saving servers");
        self.write(SESSION_SCOPE, SERVERS_KEY, servers.to_vec()).await
    }

    async fn is_first_run(&self) -> Result<bool> {
        let first_run: Option<bool> = self
            .blocking(|kv| kv.get_scoped(&[DEVICE_SCOPE, FIRST_RUN_KEY]))
            .await?;
        Ok(first_run.unwrap_or(true))
    }

    async fn set_first_run(&self, first_run: bool) -> Result<()> {
        self.write(DEVICE_SCOPE, FIRST_RUN_KEY, first_run).await
    }
}
