//! Explicit authenticated-session context.
//!
//! A [`Session`] is passed by reference to every [`ApiClient`](crate::api::ApiClient)
//! call instead of living in global state. The CLI persists it as JSON
//! between invocations.

use std::fs::OpenOptions;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::{AuthResponse, User};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

impl Session {
    /// A session with no credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a session from a successful login or register response.
    pub fn from_auth(auth: AuthResponse) -> Self {
        Self {
            access_token: Some(auth.tokens.access),
            refresh_token: Some(auth.tokens.refresh),
            user: Some(auth.user),
        }
    }

    /// A session holding only a bearer token (e.g. supplied via flag).
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Drop all credentials.
    pub fn logout(&mut self) {
        *self = Self::anonymous();
    }

    /// Load a persisted session. A missing file yields an anonymous session.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No session file, starting anonymous");
                return Ok(Self::anonymous());
            }
            Err(source) => {
                return Err(ClientError::SessionIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&text).map_err(|source| ClientError::SessionFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist the session as JSON, replacing any previous file. On Unix the
    /// file is readable by its owner only.
    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            ClientError::SessionFormat {
                path: path.to_path_buf(),
                source,
            }
        })?;
        write_private(path, json.as_bytes()).map_err(|source| ClientError::SessionIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Remove a persisted session. Removing a missing file is not an error.
    pub fn clear(path: &Path) -> Result<(), ClientError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ClientError::SessionIo {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Write `bytes` to `path`, creating it with mode `0600` on Unix.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    // `mode` only applies when the file is created.
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(bytes)
}
