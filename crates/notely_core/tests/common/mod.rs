#![allow(dead_code)]

use async_trait::async_trait;
use notely_core::{ApiError, ApiResult, AuthApi, Credentials, Note, NoteApi, NoteDraft, NoteId, Session};
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Default)]
struct FakeNoteState {
    notes: Vec<Note>,
    next_id: i64,
    token: Option<String>,
    calls: Vec<String>,
    failures: VecDeque<ApiError>,
    require_token: bool,
}

/// Scriptable in-memory note store mirroring the backend's semantics.
#[derive(Default)]
pub struct FakeNoteApi {
    state: Mutex<FakeNoteState>,
}

impl FakeNoteApi {
    pub fn new() -> Self {
        Self::with_notes(Vec::new())
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        let next_id = notes.len() as i64 + 1;
        Self {
            state: Mutex::new(FakeNoteState {
                notes,
                next_id,
                ..FakeNoteState::default()
            }),
        }
    }

    /// Rejects creation unless a token is set, like the real backend.
    pub fn requiring_token(self) -> Self {
        self.state.lock().require_token = true;
        self
    }

    /// The next call (of any kind) fails with `err`.
    pub fn fail_next(&self, err: ApiError) {
        self.state.lock().failures.push_back(err);
    }

    /// Drops a note server-side without the client knowing.
    pub fn remove_on_server(&self, id: &NoteId) {
        self.state.lock().notes.retain(|note| &note.id != id);
    }

    pub fn server_notes(&self) -> Vec<Note> {
        self.state.lock().notes.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.lock().token.clone()
    }

    fn begin(&self, call: String) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NoteApi for FakeNoteApi {
    async fn get_all(&self) -> ApiResult<Vec<Note>> {
        self.begin("get_all".to_string())?;
        Ok(self.state.lock().notes.clone())
    }

    async fn create(&self, draft: &NoteDraft) -> ApiResult<Note> {
        self.begin(format!("create:{}", draft.content))?;
        let mut state = self.state.lock();
        if state.require_token && state.token.is_none() {
            return Err(ApiError::Unauthorized("token missing".to_string()));
        }
        let note = Note::new(state.next_id, draft.content.clone(), draft.important);
        state.next_id += 1;
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: &NoteId, note: &Note) -> ApiResult<Option<Note>> {
        self.begin(format!("update:{id}"))?;
        let mut state = self.state.lock();
        match state.notes.iter_mut().find(|existing| &existing.id == id) {
            Some(existing) => {
                *existing = note.clone();
                Ok(Some(note.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &NoteId) -> ApiResult<()> {
        self.begin(format!("delete:{id}"))?;
        self.state.lock().notes.retain(|note| &note.id != id);
        Ok(())
    }

    fn set_token(&self, token: Option<&str>) {
        self.state.lock().token = token.map(str::to_string);
    }
}

/// Auth store accepting exactly one username/password pair.
pub struct FakeAuthApi {
    username: String,
    password: String,
    name: String,
    expiration_time: i64,
    attempts: Mutex<u32>,
}

impl FakeAuthApi {
    pub fn new(username: &str, password: &str, name: &str, expiration_time: i64) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            expiration_time,
            attempts: Mutex::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        *self.attempts.lock()
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        *self.attempts.lock() += 1;
        if credentials.username == self.username && credentials.password == self.password {
            Ok(Session::new(
                self.username.clone(),
                self.name.clone(),
                format!("token-for-{}", self.username),
                self.expiration_time,
            ))
        } else {
            Err(ApiError::Unauthorized("invalid username or password".to_string()))
        }
    }
}
