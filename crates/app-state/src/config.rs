//! Session manager configuration

/// Configuration for [`crate::SessionManager`]
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Replay the persisted session when the manager is constructed
    pub refresh_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { refresh_on_start: true }
    }
}

impl SessionConfig {
    /// Enable or disable the initial refresh
    pub fn refresh_on_start(mut self, enabled: bool) -> Self {
        self.refresh_on_start = enabled;
        self
    }
}
