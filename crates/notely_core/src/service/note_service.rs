//! Note list use-case service.
//!
//! # Responsibility
//! - Hold the authoritative in-memory note list.
//! - Reconcile local state with remote store responses.
//! - Derive the filtered view shown to the user.
//!
//! # Invariants
//! - New notes are appended in completion order; the list is never re-sorted.
//! - `load` replaces the list wholesale.
//! - A failed `add` never mutates the list.
//! - The filtered view is recomputed on every call and never stored.

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::remote::{ApiError, ApiResult, NoteApi};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// What happens to a note locally when a toggle or delete fails remotely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the list unchanged.
    #[default]
    Keep,
    /// Drop the note from the local list anyway.
    Evict,
}

/// Result of `NoteService::toggle_importance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change; the local copy now mirrors its reply.
    Updated(Note),
    /// The server no longer has the note; it was dropped locally.
    AlreadyRemoved(Note),
    /// The id is not in the local list; nothing was sent.
    Missing,
}

/// Result of `NoteService::remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Note),
    /// The server no longer has the note; it was dropped locally.
    AlreadyRemoved(Note),
    /// The id is not in the local list; nothing was sent.
    Missing,
}

/// Returns `notes` when `show_all`, otherwise only the important ones.
pub fn visible(notes: &[Note], show_all: bool) -> Vec<Note> {
    if show_all {
        notes.to_vec()
    } else {
        notes.iter().filter(|note| note.important).cloned().collect()
    }
}

/// Note list state over a remote note store.
pub struct NoteService<N: NoteApi> {
    api: N,
    notes: Vec<Note>,
    failure_policy: FailurePolicy,
}

impl<N: NoteApi> NoteService<N> {
    pub fn new(api: N) -> Self {
        Self::with_failure_policy(api, FailurePolicy::default())
    }

    pub fn with_failure_policy(api: N, failure_policy: FailurePolicy) -> Self {
        Self {
            api,
            notes: Vec::new(),
            failure_policy,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Filtered view of the current list.
    pub fn visible(&self, show_all: bool) -> Vec<Note> {
        visible(&self.notes, show_all)
    }

    /// Fetches every note and replaces local state.
    pub async fn load(&mut self) -> ApiResult<usize> {
        let notes = self.api.get_all().await.inspect_err(|err| {
            warn!("event=notes_load module=notes status=error error={err}");
        })?;
        self.notes = notes;
        info!(
            "event=notes_load module=notes status=ok count={}",
            self.notes.len()
        );
        Ok(self.notes.len())
    }

    /// Creates a note remotely and appends the server copy.
    pub async fn add(&mut self, draft: &NoteDraft) -> ApiResult<Note> {
        let created = self.api.create(draft).await.inspect_err(|err| {
            warn!("event=note_add module=notes status=error error={err}");
        })?;
        self.notes.push(created.clone());
        info!(
            "event=note_add module=notes status=ok note_id={}",
            created.id
        );
        Ok(created)
    }

    /// Flips the importance flag of a local note through the remote store.
    pub async fn toggle_importance(&mut self, id: &NoteId) -> ApiResult<ToggleOutcome> {
        let Some(current) = self.get(id).cloned() else {
            warn!("event=note_toggle module=notes status=missing note_id={id}");
            return Ok(ToggleOutcome::Missing);
        };

        let changed = current.with_importance_toggled();
        match self.api.update(id, &changed).await {
            Ok(Some(returned)) => {
                self.replace(id, returned.clone());
                info!("event=note_toggle module=notes status=ok note_id={id}");
                Ok(ToggleOutcome::Updated(returned))
            }
            Ok(None) | Err(ApiError::NotFound) => {
                self.drop_local(id);
                info!("event=note_toggle module=notes status=gone note_id={id}");
                Ok(ToggleOutcome::AlreadyRemoved(current))
            }
            Err(err) => {
                warn!("event=note_toggle module=notes status=error note_id={id} error={err}");
                self.apply_failure_policy(id);
                Err(err)
            }
        }
    }

    /// Deletes a local note through the remote store.
    pub async fn remove(&mut self, id: &NoteId) -> ApiResult<RemoveOutcome> {
        let Some(current) = self.get(id).cloned() else {
            warn!("event=note_remove module=notes status=missing note_id={id}");
            return Ok(RemoveOutcome::Missing);
        };

        match self.api.delete(id).await {
            Ok(()) => {
                self.drop_local(id);
                info!("event=note_remove module=notes status=ok note_id={id}");
                Ok(RemoveOutcome::Removed(current))
            }
            Err(ApiError::NotFound) => {
                self.drop_local(id);
                info!("event=note_remove module=notes status=gone note_id={id}");
                Ok(RemoveOutcome::AlreadyRemoved(current))
            }
            Err(err) => {
                warn!("event=note_remove module=notes status=error note_id={id} error={err}");
                self.apply_failure_policy(id);
                Err(err)
            }
        }
    }

    fn replace(&mut self, id: &NoteId, note: Note) {
        if let Some(slot) = self.notes.iter_mut().find(|existing| &existing.id == id) {
            *slot = note;
        }
    }

    fn drop_local(&mut self, id: &NoteId) {
        self.notes.retain(|note| &note.id != id);
    }

    fn apply_failure_policy(&mut self, id: &NoteId) {
        if self.failure_policy == FailurePolicy::Evict {
            self.drop_local(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::visible;
    use crate::model::note::Note;

    fn sample() -> Vec<Note> {
        vec![
            Note::new(1, "a", false),
            Note::new(2, "b", true),
            Note::new(3, "c", true),
        ]
    }

    #[test]
    fn show_all_returns_list_unchanged() {
        let notes = sample();
        assert_eq!(visible(&notes, true), notes);
    }

    #[test]
    fn important_only_keeps_order() {
        let shown = visible(&sample(), false);
        let ids: Vec<&str> = shown.iter().map(|note| note.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn empty_list_stays_empty() {
        assert!(visible(&[], false).is_empty());
        assert!(visible(&[], true).is_empty());
    }
}
