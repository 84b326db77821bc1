//! Application controller.
//!
//! # Responsibility
//! - Own every piece of client state: notes, session, notifications, filter
//!   and draft text.
//! - Translate user actions into service calls and user-facing messages.
//!
//! # Invariants
//! - State is only mutated through the methods below; collaborators never
//!   reach into it.
//! - No action is fatal: failures become error notifications.
//! - A token failure on any note operation logs the user out.

use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::notification::{Notification, NotificationKind};
use crate::model::session::Session;
use crate::remote::{ApiError, AuthApi, NoteApi};
use crate::service::note_service::{FailurePolicy, NoteService, RemoveOutcome, ToggleOutcome};
use crate::service::notification::{NotificationChannel, DEFAULT_NOTIFICATION_TTL};
use crate::service::session_service::{
    RestoreOutcome, SessionError, SessionService, DEFAULT_SESSION_KEY,
};
use crate::storage::KeyValueStore;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

pub const WRONG_CREDENTIALS: &str = "Wrong credentials";
pub const SESSION_EXPIRED: &str = "Session expired, please log in again";

/// Wiring options for `NoteApp`.
#[derive(Clone)]
pub struct AppOptions {
    pub session_key: String,
    pub notification_ttl: Duration,
    pub failure_policy: FailurePolicy,
    pub clock: Arc<dyn Clock>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            session_key: DEFAULT_SESSION_KEY.to_string(),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            failure_policy: FailurePolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl AppOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            session_key: config.session.storage_key.clone(),
            notification_ttl: config.notification_ttl(),
            failure_policy: config.notes.on_failure,
            ..Self::default()
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Note client state and actions.
pub struct NoteApp<N: NoteApi + 'static, A: AuthApi, S: KeyValueStore> {
    notes: NoteService<Arc<N>>,
    session: SessionService<A, S>,
    notifications: NotificationChannel,
    show_all: bool,
    draft: String,
}

impl<N: NoteApi + 'static, A: AuthApi, S: KeyValueStore> NoteApp<N, A, S> {
    pub fn new(note_api: Arc<N>, auth_api: A, storage: S, options: AppOptions) -> Self {
        let token_sink: Arc<dyn NoteApi> = note_api.clone();
        Self {
            notes: NoteService::with_failure_policy(note_api, options.failure_policy),
            session: SessionService::new(
                auth_api,
                storage,
                token_sink,
                options.clock,
                options.session_key,
            ),
            notifications: NotificationChannel::new(options.notification_ttl),
            show_all: true,
            draft: String::new(),
        }
    }

    /// Restores the persisted session and loads the note list.
    ///
    /// Returns whether the note list loaded. When the stored session had
    /// expired and the load failed too, both causes share the error message.
    pub async fn start(&mut self) -> bool {
        let expired = match self.session.restore() {
            Ok(RestoreOutcome::Expired(_)) => true,
            Ok(RestoreOutcome::Restored(_) | RestoreOutcome::NoSession) => false,
            Err(err) => {
                warn!("event=app_start module=app status=error error={err}");
                self.notifications.error(err.to_string());
                false
            }
        };

        let loaded = self.reload().await;
        if expired {
            let message = match self.notifications.text(NotificationKind::Error) {
                Some(load_error) if !loaded => format!("{SESSION_EXPIRED} ({load_error})"),
                _ => SESSION_EXPIRED.to_string(),
            };
            self.notifications.error(message);
        }
        loaded
    }

    /// Re-fetches the note list, replacing local state.
    pub async fn reload(&mut self) -> bool {
        match self.notes.load().await {
            Ok(_) => true,
            Err(err) => {
                self.report_failure(err.message().to_string(), &err);
                false
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        match self.session.login(username, password).await {
            Ok(session) => {
                self.notifications.info(format!("Welcome {}", session.name));
                true
            }
            Err(SessionError::InvalidCredentials) => {
                self.notifications.error(WRONG_CREDENTIALS);
                false
            }
            Err(err) => {
                warn!("event=app_login module=app status=error error={err}");
                self.notifications.error(err.to_string());
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.drop_session();
        self.notifications.info("Logged out");
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Submits the draft text as a new note; the draft is cleared on success.
    pub async fn submit_draft(&mut self, important: bool) -> Option<Note> {
        let draft = NoteDraft::new(self.draft.clone(), important);
        let created = self.add_note(&draft).await?;
        self.draft.clear();
        Some(created)
    }

    pub async fn add_note(&mut self, draft: &NoteDraft) -> Option<Note> {
        self.expire_stale_session();
        match self.notes.add(draft).await {
            Ok(created) => {
                self.notifications.info(format!("Added {}", created.content));
                Some(created)
            }
            Err(err) => {
                self.report_failure(err.message().to_string(), &err);
                None
            }
        }
    }

    pub async fn toggle_importance(&mut self, id: &NoteId) -> Option<Note> {
        self.expire_stale_session();
        match self.notes.toggle_importance(id).await {
            Ok(ToggleOutcome::Updated(note)) => Some(note),
            Ok(ToggleOutcome::AlreadyRemoved(note)) => {
                self.notifications
                    .error(already_removed_message(&note.content));
                None
            }
            Ok(ToggleOutcome::Missing) => {
                self.notifications
                    .error(already_removed_message(id.as_str()));
                None
            }
            Err(err) => {
                self.report_failure(err.message().to_string(), &err);
                None
            }
        }
    }

    pub async fn delete_note(&mut self, id: &NoteId) -> bool {
        self.expire_stale_session();
        match self.notes.remove(id).await {
            Ok(RemoveOutcome::Removed(note)) => {
                self.notifications.info(format!("Deleted {}", note.content));
                true
            }
            Ok(RemoveOutcome::AlreadyRemoved(note)) => {
                self.notifications
                    .error(already_removed_message(&note.content));
                false
            }
            Ok(RemoveOutcome::Missing) => {
                self.notifications
                    .error(already_removed_message(id.as_str()));
                false
            }
            Err(err) => {
                self.report_failure(format!("Error deleting the note: {}", err.message()), &err);
                false
            }
        }
    }

    pub fn toggle_show_all(&mut self) {
        self.show_all = !self.show_all;
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn set_show_all(&mut self, show_all: bool) {
        self.show_all = show_all;
    }

    /// Notes the user currently sees, recomputed from the authoritative list.
    pub fn visible_notes(&self) -> Vec<Note> {
        self.notes.visible(self.show_all)
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.current()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.current().is_some()
    }

    pub fn notification(&self, kind: NotificationKind) -> Option<Notification> {
        self.notifications.current(kind)
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    fn report_failure(&mut self, message: String, err: &ApiError) {
        self.notifications.error(message);
        if err.is_token_failure() {
            info!("event=app_token_rejected module=app status=logout");
            self.drop_session();
        }
    }

    fn expire_stale_session(&mut self) {
        match self.session.expire_if_stale() {
            Ok(true) => self.notifications.error(SESSION_EXPIRED),
            Ok(false) => {}
            Err(err) => warn!("event=app_session_check module=app status=error error={err}"),
        }
    }

    fn drop_session(&mut self) {
        if let Err(err) = self.session.invalidate() {
            warn!("event=app_logout module=app status=error error={err}");
        }
    }
}

fn already_removed_message(subject: &str) -> String {
    format!("Note '{subject}' was already removed from server")
}
