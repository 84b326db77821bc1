//! Transient notification channel.
//!
//! # Responsibility
//! - Hold at most one live message per `NotificationKind`.
//! - Clear each message automatically after a fixed delay.
//!
//! # Invariants
//! - Re-showing a kind aborts that kind's pending clear task first.
//! - A clear task only removes the message it was armed for.
//! - A message past `expires_at` is never reported, even if its task has not run.

use crate::model::notification::{Notification, NotificationKind};
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default visibility of a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Default)]
struct Slot {
    notification: Option<Notification>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Slot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    info: Slot,
    error: Slot,
    next_generation: u64,
}

impl Slots {
    fn slot_mut(&mut self, kind: NotificationKind) -> &mut Slot {
        match kind {
            NotificationKind::Info => &mut self.info,
            NotificationKind::Error => &mut self.error,
        }
    }

    fn slot(&self, kind: NotificationKind) -> &Slot {
        match kind {
            NotificationKind::Info => &self.info,
            NotificationKind::Error => &self.error,
        }
    }
}

/// Auto-expiring info/error messages.
#[derive(Debug)]
pub struct NotificationChannel {
    ttl: Duration,
    slots: Arc<Mutex<Slots>>,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl NotificationChannel {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(NotificationKind::Info, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(NotificationKind::Error, text);
    }

    /// Replaces the message of `kind` and re-arms its clear timer.
    ///
    /// Outside a tokio runtime no timer is spawned; the message still stops
    /// being reported once it passes `expires_at`.
    pub fn show(&self, kind: NotificationKind, text: impl Into<String>) {
        let text = text.into();
        let expires_at = Instant::now() + self.ttl;
        debug!(
            "event=notification_show module=notification kind={} ttl_ms={}",
            kind.as_str(),
            self.ttl.as_millis()
        );

        let mut slots = self.slots.lock();
        slots.next_generation += 1;
        let generation = slots.next_generation;

        let slot = slots.slot_mut(kind);
        slot.cancel_timer();
        slot.notification = Some(Notification {
            text,
            kind,
            expires_at,
        });
        slot.generation = generation;
        let shared = Arc::clone(&self.slots);
        slot.timer = Handle::try_current()
            .ok()
            .map(|runtime| runtime.spawn(clear_after(shared, kind, generation, expires_at)));
    }

    /// Returns the live message of `kind`.
    pub fn current(&self, kind: NotificationKind) -> Option<Notification> {
        let now = Instant::now();
        self.slots
            .lock()
            .slot(kind)
            .notification
            .as_ref()
            .filter(|notification| notification.is_live_at(now))
            .cloned()
    }

    /// Text of the live message of `kind`.
    pub fn text(&self, kind: NotificationKind) -> Option<String> {
        self.current(kind).map(|notification| notification.text)
    }

    pub fn clear(&self, kind: NotificationKind) {
        let mut slots = self.slots.lock();
        let slot = slots.slot_mut(kind);
        slot.cancel_timer();
        slot.notification = None;
    }

    pub fn clear_all(&self) {
        self.clear(NotificationKind::Info);
        self.clear(NotificationKind::Error);
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        slots.info.cancel_timer();
        slots.error.cancel_timer();
    }
}

async fn clear_after(
    slots: Arc<Mutex<Slots>>,
    kind: NotificationKind,
    generation: u64,
    deadline: Instant,
) {
    tokio::time::sleep_until(deadline).await;
    let mut slots = slots.lock();
    let slot = slots.slot_mut(kind);
    if slot.generation == generation {
        slot.notification = None;
        slot.timer = None;
        debug!(
            "event=notification_clear module=notification kind={}",
            kind.as_str()
        );
    }
}
