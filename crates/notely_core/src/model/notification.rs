//! Transient notification model.

use tokio::time::Instant;

/// Notification category. Each kind has at most one live message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Informational outcome of a successful action.
    Info,
    /// Failure or inconsistency the user should see.
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A user-visible message that disappears after a fixed delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

impl Notification {
    /// Returns whether the message is still visible at `now`.
    pub fn is_live_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}
