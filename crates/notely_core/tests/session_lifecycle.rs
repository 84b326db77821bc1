mod common;

use common::{FakeAuthApi, FakeNoteApi};
use notely_core::{
    FixedClock, KeyValueStore, MemoryKeyValueStore, NoteApi, RestoreOutcome, Session,
    SessionError, SessionService, SqliteKeyValueStore, DEFAULT_SESSION_KEY,
};
use std::sync::Arc;

const NOW: i64 = 1_700_000_000_000;
const HOUR: i64 = 60 * 60 * 1000;

struct Fixture {
    notes: Arc<FakeNoteApi>,
    storage: Arc<MemoryKeyValueStore>,
    clock: Arc<FixedClock>,
    auth: Arc<FakeAuthApi>,
    service: SessionService<Arc<FakeAuthApi>, Arc<MemoryKeyValueStore>>,
}

fn fixture() -> Fixture {
    let notes = Arc::new(FakeNoteApi::new());
    let storage = Arc::new(MemoryKeyValueStore::new());
    let clock = Arc::new(FixedClock::new(NOW));
    let auth = Arc::new(FakeAuthApi::new("mluukkai", "salainen", "Matti Luukkainen", NOW + HOUR));
    let token_sink: Arc<dyn NoteApi> = notes.clone();
    let service = SessionService::new(
        auth.clone(),
        storage.clone(),
        token_sink,
        clock.clone(),
        DEFAULT_SESSION_KEY,
    );
    Fixture {
        notes,
        storage,
        clock,
        auth,
        service,
    }
}

fn store_session(storage: &MemoryKeyValueStore, session: &Session) {
    storage
        .set(DEFAULT_SESSION_KEY, &serde_json::to_string(session).unwrap())
        .unwrap();
}

#[test]
fn restore_without_record_yields_no_session() {
    let mut fx = fixture();
    assert_eq!(fx.service.restore().unwrap(), RestoreOutcome::NoSession);
    assert!(fx.service.current().is_none());
    assert_eq!(fx.notes.token(), None);
}

#[test]
fn restore_valid_record_propagates_token() {
    let mut fx = fixture();
    let session = Session::new("mluukkai", "Matti", "abc", NOW + HOUR);
    store_session(&fx.storage, &session);

    assert_eq!(
        fx.service.restore().unwrap(),
        RestoreOutcome::Restored(session.clone())
    );
    assert_eq!(fx.service.current(), Some(&session));
    assert_eq!(fx.notes.token().as_deref(), Some("abc"));
}

#[test]
fn restore_expired_record_clears_storage_and_token() {
    let mut fx = fixture();
    fx.notes.set_token(Some("stale"));
    let session = Session::new("mluukkai", "Matti", "abc", NOW - 1);
    store_session(&fx.storage, &session);

    assert_eq!(
        fx.service.restore().unwrap(),
        RestoreOutcome::Expired(session)
    );
    assert!(fx.service.current().is_none());
    assert!(fx.storage.is_empty());
    assert_eq!(fx.notes.token(), None);
}

#[test]
fn restore_corrupt_record_is_discarded() {
    let mut fx = fixture();
    fx.storage.set(DEFAULT_SESSION_KEY, "{not json").unwrap();

    assert_eq!(fx.service.restore().unwrap(), RestoreOutcome::NoSession);
    assert!(fx.storage.is_empty());
}

#[tokio::test]
async fn login_persists_session_and_token() {
    let mut fx = fixture();

    let session = fx.service.login("mluukkai", "salainen").await.unwrap();

    assert_eq!(session.name, "Matti Luukkainen");
    assert_eq!(fx.notes.token().as_deref(), Some("token-for-mluukkai"));
    let stored = fx.storage.get(DEFAULT_SESSION_KEY).unwrap().unwrap();
    let stored: Session = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored, session);
}

#[tokio::test]
async fn bad_login_fails_closed_after_one_attempt() {
    let mut fx = fixture();

    let err = fx.service.login("mluukkai", "wrong").await.unwrap_err();

    assert!(matches!(err, SessionError::InvalidCredentials));
    assert_eq!(fx.auth.attempts(), 1);
    assert!(fx.service.current().is_none());
    assert!(fx.storage.is_empty());
    assert_eq!(fx.notes.token(), None);
}

#[tokio::test]
async fn invalidate_clears_everything() {
    let mut fx = fixture();
    fx.service.login("mluukkai", "salainen").await.unwrap();

    fx.service.invalidate().unwrap();

    assert!(fx.service.current().is_none());
    assert!(fx.storage.is_empty());
    assert_eq!(fx.notes.token(), None);
}

#[tokio::test]
async fn session_goes_stale_as_time_passes() {
    let mut fx = fixture();
    fx.service.login("mluukkai", "salainen").await.unwrap();
    assert!(!fx.service.expire_if_stale().unwrap());

    fx.clock.advance(HOUR);

    assert!(fx.service.expire_if_stale().unwrap());
    assert!(fx.service.current().is_none());
    assert!(fx.storage.is_empty());
}

#[tokio::test]
async fn session_survives_reopening_sqlite_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.sqlite3");
    let notes = Arc::new(FakeNoteApi::new());
    let clock = Arc::new(FixedClock::new(NOW));
    let auth = FakeAuthApi::new("root", "sekret", "Superuser", NOW + HOUR);

    {
        let storage = SqliteKeyValueStore::open(&path).unwrap();
        let mut service =
            SessionService::new(auth, storage, notes.clone(), clock.clone(), "session");
        service.login("root", "sekret").await.unwrap();
    }

    notes.set_token(None);
    let storage = SqliteKeyValueStore::open(&path).unwrap();
    let auth = FakeAuthApi::new("root", "sekret", "Superuser", NOW + HOUR);
    let mut service = SessionService::new(auth, storage, notes.clone(), clock, "session");

    let outcome = service.restore().unwrap();
    assert!(matches!(outcome, RestoreOutcome::Restored(ref s) if s.username == "root"));
    assert_eq!(notes.token().as_deref(), Some("token-for-root"));
}
