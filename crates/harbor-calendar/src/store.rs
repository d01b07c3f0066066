//! On-disk token persistence.
//!
//! Tokens live as JSON under the platform config directory
//! (`<config_dir>/harbor/calendar_token.json`). The access token is stored
//! with its absolute expiry so staleness checks survive restarts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::oauth::TokenResponse;
use crate::CalendarError;

/// Expiry slack: a token this close to expiring is treated as expired so
/// an in-flight request cannot outlive it.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Persisted OAuth tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Convert a token-endpoint response into a stored token.
    ///
    /// On refresh responses (no `refresh_token` field) the previous refresh
    /// token is carried over via `prior_refresh`.
    pub fn from_response(
        response: &TokenResponse,
        prior_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone().or(prior_refresh),
            expires_at: now + Duration::seconds(response.expires_in),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

/// Reads and writes the token file.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default token path under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("harbor").join("calendar_token.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token, if any. A corrupt file is treated as absent
    /// and logged rather than failing the caller.
    pub fn load(&self) -> Option<StoredToken> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt token file");
                None
            }
        }
    }

    pub fn save(&self, token: &StoredToken) -> Result<(), CalendarError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CalendarError::TokenStore(format!("create dir: {e}")))?;
        }
        let json = serde_json::to_string_pretty(token)
            .map_err(|e| CalendarError::TokenStore(format!("serialize: {e}")))?;
        std::fs::write(&self.path, json)
            .map_err(|e| CalendarError::TokenStore(format!("write: {e}")))?;

        // Tokens are credentials: keep the file owner-only where possible.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600));
        }

        tracing::debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    /// Delete the stored token. Succeeds if it was already gone.
    pub fn clear(&self) -> Result<(), CalendarError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CalendarError::TokenStore(format!("remove: {e}"))),
        }
    }
}
