//! Session lifecycle service.
//!
//! # Responsibility
//! - Restore, create and invalidate the persisted user session.
//! - Propagate the session token to the remote note store.
//!
//! # Invariants
//! - This service is the only writer of the session storage key.
//! - `is_expired` is the single authority for session validity.
//! - Login is a single attempt; any auth failure maps to `InvalidCredentials`.

use crate::clock::Clock;
use crate::model::session::{Credentials, Session};
use crate::remote::{AuthApi, NoteApi};
use crate::storage::{KeyValueStore, StorageError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Default storage key holding the serialized session.
pub const DEFAULT_SESSION_KEY: &str = "loggedNoteappUser";

/// Session service failure.
#[derive(Debug)]
pub enum SessionError {
    /// The auth store rejected the login attempt.
    InvalidCredentials,
    /// Reading or writing the persisted record failed.
    Storage(StorageError),
    /// The session could not be serialized for storage.
    Encode(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(details) => write!(f, "failed to encode session: {details}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Result of reading the persisted session at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing usable was stored.
    NoSession,
    /// A session was stored but had expired; it has been cleared.
    Expired(Session),
    /// A valid session is active and its token propagated.
    Restored(Session),
}

/// Owner of the single active session.
pub struct SessionService<A: AuthApi, S: KeyValueStore> {
    auth: A,
    storage: S,
    token_sink: Arc<dyn NoteApi>,
    clock: Arc<dyn Clock>,
    storage_key: String,
    current: Option<Session>,
}

impl<A: AuthApi, S: KeyValueStore> SessionService<A, S> {
    pub fn new(
        auth: A,
        storage: S,
        token_sink: Arc<dyn NoteApi>,
        clock: Arc<dyn Clock>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            storage,
            token_sink,
            clock,
            storage_key: storage_key.into(),
            current: None,
        }
    }

    /// Returns the active session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Returns whether `session` is past its expiration right now.
    pub fn is_expired(&self, session: &Session) -> bool {
        session.is_expired_at(self.clock.now_ms())
    }

    /// Reads the persisted session and activates it when still valid.
    ///
    /// Expired or unreadable records are removed from storage.
    pub fn restore(&mut self) -> Result<RestoreOutcome, SessionError> {
        let Some(raw) = self.storage.get(&self.storage_key)? else {
            self.current = None;
            return Ok(RestoreOutcome::NoSession);
        };

        let session = match serde_json::from_str::<Session>(&raw) {
            Ok(session) => session,
            Err(err) => {
                warn!(
                    "event=session_restore module=session status=error error_code=corrupt_record error={err}"
                );
                self.invalidate()?;
                return Ok(RestoreOutcome::NoSession);
            }
        };

        if self.is_expired(&session) {
            info!(
                "event=session_restore module=session status=expired username={}",
                session.username
            );
            self.invalidate()?;
            return Ok(RestoreOutcome::Expired(session));
        }

        self.token_sink.set_token(Some(&session.token));
        self.current = Some(session.clone());
        info!(
            "event=session_restore module=session status=ok username={}",
            session.username
        );
        Ok(RestoreOutcome::Restored(session))
    }

    /// Authenticates once against the auth store and persists the session.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, SessionError> {
        let credentials = Credentials::new(username, password);
        let session = match self.auth.login(&credentials).await {
            Ok(session) => session,
            Err(err) => {
                warn!(
                    "event=session_login module=session status=error username={} error={}",
                    username, err
                );
                return Err(SessionError::InvalidCredentials);
            }
        };

        let raw =
            serde_json::to_string(&session).map_err(|err| SessionError::Encode(err.to_string()))?;
        self.storage.set(&self.storage_key, &raw)?;
        self.token_sink.set_token(Some(&session.token));
        self.current = Some(session.clone());

        info!(
            "event=session_login module=session status=ok username={}",
            session.username
        );
        Ok(session)
    }

    /// Drops the active session, its propagated token and the stored record.
    ///
    /// The in-memory state is cleared even when the storage write fails.
    pub fn invalidate(&mut self) -> Result<(), SessionError> {
        self.current = None;
        self.token_sink.set_token(None);
        self.storage.remove(&self.storage_key)?;
        info!("event=session_invalidate module=session status=ok");
        Ok(())
    }

    /// Invalidates the active session if it has expired since it was loaded.
    ///
    /// Returns `true` when a stale session was dropped.
    pub fn expire_if_stale(&mut self) -> Result<bool, SessionError> {
        let stale = self
            .current
            .as_ref()
            .is_some_and(|session| self.is_expired(session));
        if stale {
            self.invalidate()?;
        }
        Ok(stale)
    }
}
