//! Session and credential models.
//!
//! # Responsibility
//! - Define the persisted record proving an authenticated user.
//! - Keep secrets out of `Debug` output and log lines.
//!
//! # Invariants
//! - `expiration_time` is Unix epoch milliseconds.
//! - The serialized shape uses `expirationTime` to match the stored record.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Authenticated user session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub name: String,
    pub token: String,
    /// Unix epoch milliseconds after which the token is no longer valid.
    pub expiration_time: i64,
}

impl Session {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        token: impl Into<String>,
        expiration_time: i64,
    ) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            token: token.into(),
            expiration_time,
        }
    }

    /// Returns whether this session is past its expiration at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expiration_time <= now_ms
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .field("expiration_time", &self.expiration_time)
            .finish()
    }
}

/// Login input sent to the remote auth store.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
