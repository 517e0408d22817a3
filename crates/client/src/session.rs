//! Login session: token and identity of the current user.
//!
//! The session is an explicit object shared (through `Arc`) by every client
//! that needs the token. It is persisted as a small JSON file so the next start
//! can restore it; no file means logged out.

use std::{
    fs,
    path::PathBuf,
    sync::RwLock,
};

use api_types::user::LoginResponse;
use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_SESSION_PATH: &str = "config/session.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(flatten)]
    pub user: SessionUser,
}

impl From<LoginResponse> for Session {
    fn from(value: LoginResponse) -> Self {
        Self {
            token: value.token,
            user: SessionUser {
                id: value.id,
                user_name: value.user_name,
            },
        }
    }
}

/// File backing the session.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<Session>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_PATH)
    }
}

/// Current session plus its backing store.
#[derive(Debug)]
pub struct SessionContext {
    store: SessionStore,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Loads the stored session, if any.
    ///
    /// A corrupted file is treated as logged out and removed.
    pub fn restore(&self) -> Result<Option<SessionUser>> {
        let session = match self.store.load() {
            Ok(session) => session,
            Err(crate::ClientError::Json(err)) => {
                tracing::warn!("discarding unreadable session file: {err}");
                self.store.clear()?;
                None
            }
            Err(err) => return Err(err),
        };
        let user = session.as_ref().map(|s| s.user.clone());
        *self.current.write().unwrap_or_else(|err| err.into_inner()) = session;
        Ok(user)
    }

    /// Replaces the current session with the one issued by a login.
    pub fn establish(&self, login: LoginResponse) -> Result<SessionUser> {
        let session = Session::from(login);
        self.store.save(&session)?;
        let user = session.user.clone();
        *self.current.write().unwrap_or_else(|err| err.into_inner()) = Some(session);
        tracing::info!(user_id = user.id, user_name = %user.user_name, "session established");
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        *self.current.write().unwrap_or_else(|err| err.into_inner()) = None;
        self.store.clear()?;
        tracing::info!("session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.current
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}
