//! Persisted session records
//!
//! These are the records the session layer reads and writes: the identity of
//! the last signed-in user and the list of configured backend servers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally persisted identity of the last successfully authenticated user
///
/// `UserAuth::default()` is the logged-out record.
///
/// # Example
///
/// ```rust
/// use storage::UserAuth;
///
/// let auth = UserAuth::default();
/// assert!(!auth.is_logged_in);
/// assert!(auth.username.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserAuth {
    /// Whether this record describes a signed-in user
    #[serde(default)]
    pub is_logged_in: bool,
    /// Locally generated user identifier
    #[serde(default)]
    pub user_id: String,
    /// Username as entered at login (trimmed)
    #[serde(default)]
    pub username: String,
    /// Id of the server the user signed in against
    #[serde(default)]
    pub current_server_id: String,
    /// When the login completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserAuth {
    /// Create a signed-in record
    pub fn logged_in(
        user_id: impl Into<String>,
        username: impl Into<String>,
        current_server_id: impl Into<String>,
    ) -> Self {
        Self {
            is_logged_in: true,
            user_id: user_id.into(),
            username: username.into(),
            current_server_id: current_server_id.into(),
            last_login_at: Some(Utc::now()),
        }
    }
}

/// A configured backend endpoint
///
/// Only `id` and `is_active` carry meaning for the session layer. Any other
/// connection fields found in storage are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Unique server id
    pub id: String,
    /// Whether this server is the selected one
    #[serde(default)]
    pub is_active: bool,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Base URL of the server
    #[serde(default)]
    pub url: String,
    /// Opaque connection details
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerConfig {
    /// Create an inactive server entry
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_active: false,
            name: name.into(),
            url: url.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Mark the entry as active (builder style)
    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }
}
