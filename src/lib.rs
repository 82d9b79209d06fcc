//! Courier App
//!
//! Application wiring for the delivery-tracking app's session core. The UI
//! layer opens a [`CourierApp`] once at launch and hands its
//! [`SessionManager`] to every screen that needs the signed-in identity.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub use app_state::{AuthState, FailureReason, SessionConfig, SessionError, SessionManager, SessionPhase};
pub use networking::{SimulatedAuthBackend, SimulatedBackendConfig};
pub use storage::{KvConfig, KvSessionStore, KvStore, ServerConfig, UserAuth};

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// On-device key-value store
    pub kv: KvConfig,
    /// Login round-trip simulation
    pub backend: SimulatedBackendConfig,
    /// Session manager behaviour
    pub session: SessionConfig,
}

impl AppConfig {
    /// Configuration storing app data under `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let path = data_dir.into().join("courier_kv.db");
        Self {
            kv: KvConfig::new(path.to_string_lossy().into_owned()),
            backend: SimulatedBackendConfig::default(),
            session: SessionConfig::default(),
        }
    }

    /// Replace the backend configuration
    pub fn backend(mut self, backend: SimulatedBackendConfig) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the session configuration
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}

/// An opened application: storage plus the shared session manager
pub struct CourierApp {
    kv: Arc<KvStore>,
    session: Arc<SessionManager>,
}

impl CourierApp {
    /// Open storage and restore the persisted session
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let kv = KvStore::new(config.kv.clone())
            .with_context(|| format!("failed to open key-value store at {}", config.kv.path))?;
        let kv = Arc::new(kv);

        let store = Arc::new(KvSessionStore::new(Arc::clone(&kv)));
        let backend = Arc::new(SimulatedAuthBackend::new(config.backend));
        let session = SessionManager::new(store, backend, config.session).await;

        tracing::info!(
            path = %config.kv.path,
            authenticated = session.snapshot().is_authenticated,
            "courier app opened"
        );

        Ok(Self { kv, session: Arc::new(session) })
    }

    /// Shared session manager
    pub fn session(&self) -> Arc<SessionManager> {
        Arc::clone(&self.session)
    }

    /// Flush pending writes, e.g. before the app is suspended
    pub fn flush(&self) -> anyhow::Result<()> {
        self.kv.flush().context("failed to flush key-value store")
    }
}

/// Install the global tracing subscriber
///
/// Honours `RUST_LOG` and defaults to `info`. Calling it again is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
