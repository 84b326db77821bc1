//! Core client logic for notely.
//! This crate owns note list state, the user session and transient
//! notifications; transport and storage sit behind traits.

pub mod app;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod service;
pub mod storage;

pub use app::{AppOptions, NoteApp, SESSION_EXPIRED, WRONG_CREDENTIALS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ClientConfig, ConfigError};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::note::{Note, NoteDraft, NoteId};
pub use model::notification::{Notification, NotificationKind};
pub use model::session::{Credentials, Session};
pub use remote::{ApiError, ApiResult, AuthApi, HttpAuthApi, HttpNoteApi, NoteApi};
pub use service::note_service::{visible, FailurePolicy, NoteService, RemoveOutcome, ToggleOutcome};
pub use service::notification::{NotificationChannel, DEFAULT_NOTIFICATION_TTL};
pub use service::session_service::{
    RestoreOutcome, SessionError, SessionService, DEFAULT_SESSION_KEY,
};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
