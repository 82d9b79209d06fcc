//! Authentication round-trip to a delivery server

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use storage::ServerConfig;
use thiserror::Error;

/// Authentication backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// Server could not be reached
    #[error("Server unreachable: {0}")]
    Unreachable(String),
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Username and password submitted at login
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username as typed
    pub username: String,
    /// Password as typed
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// Trimmed username
    pub fn username(&self) -> &str {
        self.username.trim()
    }

    /// Whether both fields contain something other than whitespace
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Performs the login round-trip against a server
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Authenticate `credentials` against `server`
    async fn authenticate(&self, server: &ServerConfig, credentials: &Credentials) -> Result<()>;
}

/// Configuration for [`SimulatedAuthBackend`]
#[derive(Debug, Clone)]
pub struct SimulatedBackendConfig {
    /// How long the simulated round-trip takes
    pub delay: Duration,
}

impl Default for SimulatedBackendConfig {
    fn default() -> Self {
        Self { delay: Duration::from_millis(1000) }
    }
}

impl SimulatedBackendConfig {
    /// Set the round-trip delay
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Backend that waits for a fixed delay and then accepts
///
/// Credential checks are left to the caller. The delay cannot be cancelled
/// other than by dropping the future.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAuthBackend {
    config: SimulatedBackendConfig,
}

impl SimulatedAuthBackend {
    /// Create a simulated backend
    pub fn new(config: SimulatedBackendConfig) -> Self {
        Self { config }
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.config.delay
    }
}

#[async_trait]
impl AuthBackend for SimulatedAuthBackend {
    async fn authenticate(&self, server: &ServerConfig, credentials: &Credentials) -> Result<()> {
        tracing::debug!(
            server_id = %server.id,
            username = credentials.username(),
            delay_ms = self.config.delay.as_millis() as u64,
            "simulating login round-trip"
        );
        tokio::time::sleep(self.config.delay).await;
        Ok(())
    }
}
