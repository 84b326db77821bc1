//! Remote collaborator contracts and their HTTP implementation.
//!
//! # Responsibility
//! - Define the note store and auth store contracts the services depend on.
//! - Carry transport failures as a typed `ApiError` instead of raw HTTP shapes.
//!
//! # Invariants
//! - Services only ever see `ApiError`; no `reqwest` type crosses this boundary.
//! - `NoteApi::update` reports a missing note as `Ok(None)`, never as an error.

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::session::{Credentials, Session};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod http;

pub use http::{classify_failure, HttpAuthApi, HttpNoteApi};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The addressed resource does not exist on the server.
    NotFound,
    /// The request carried a missing, invalid or expired token.
    Unauthorized(String),
    /// The server refused the request with its own error text.
    Rejected { status: u16, message: String },
    /// The request never produced a response.
    Transport(String),
    /// The response body did not match the expected shape.
    Decode(String),
}

impl ApiError {
    /// Human-readable text suitable for surfacing verbatim to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound => "not found",
            Self::Unauthorized(message) => message,
            Self::Rejected { message, .. } => message,
            Self::Transport(message) => message,
            Self::Decode(message) => message,
        }
    }

    /// Returns whether this failure means the session token is no longer usable.
    pub fn is_token_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "resource not found"),
            Self::Unauthorized(message) => write!(f, "unauthorized: {message}"),
            Self::Rejected { status, message } => write!(f, "rejected ({status}): {message}"),
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::Decode(message) => write!(f, "invalid response: {message}"),
        }
    }
}

impl Error for ApiError {}

/// Remote note store.
#[async_trait]
pub trait NoteApi: Send + Sync {
    /// Fetches the full note collection.
    async fn get_all(&self) -> ApiResult<Vec<Note>>;
    /// Creates a note and returns the server representation with its id.
    async fn create(&self, draft: &NoteDraft) -> ApiResult<Note>;
    /// Replaces a note. `Ok(None)` means the note no longer exists.
    async fn update(&self, id: &NoteId, note: &Note) -> ApiResult<Option<Note>>;
    async fn delete(&self, id: &NoteId) -> ApiResult<()>;
    /// Sets or clears the bearer token sent with authorized requests.
    fn set_token(&self, token: Option<&str>);
}

/// Remote auth store.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session>;
}

#[async_trait]
impl<T: NoteApi + ?Sized> NoteApi for Arc<T> {
    async fn get_all(&self) -> ApiResult<Vec<Note>> {
        (**self).get_all().await
    }

    async fn create(&self, draft: &NoteDraft) -> ApiResult<Note> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &NoteId, note: &Note) -> ApiResult<Option<Note>> {
        (**self).update(id, note).await
    }

    async fn delete(&self, id: &NoteId) -> ApiResult<()> {
        (**self).delete(id).await
    }

    fn set_token(&self, token: Option<&str>) {
        (**self).set_token(token)
    }
}

#[async_trait]
impl<T: AuthApi + ?Sized> AuthApi for Arc<T> {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        (**self).login(credentials).await
    }
}
