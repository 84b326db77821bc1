//! `reqwest`-backed note and auth stores.
//!
//! # Responsibility
//! - Speak the notes backend wire format (`/api/notes`, `/api/login`).
//! - Map HTTP status codes and `{ "error": ... }` bodies onto `ApiError`.
//!
//! # Invariants
//! - The bearer token is attached to every note request while one is set.
//! - Tokens and passwords never appear in log lines.

use super::{ApiError, ApiResult, AuthApi, NoteApi};
use crate::clock::{Clock, SystemClock};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::session::{Credentials, Session};
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const NOTES_PATH: &str = "/api/notes";
const LOGIN_PATH: &str = "/api/login";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    expiration_time: Option<i64>,
}

/// Note store client for the notes REST backend.
pub struct HttpNoteApi {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpNoteApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: normalize_base_url(base_url),
            token: RwLock::new(None),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}{NOTES_PATH}", self.base_url)
    }

    fn note_url(&self, id: &NoteId) -> String {
        format!("{}{NOTES_PATH}/{id}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Returns whether a bearer token is currently attached to requests.
    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }
}

#[async_trait]
impl NoteApi for HttpNoteApi {
    async fn get_all(&self) -> ApiResult<Vec<Note>> {
        debug!("event=api_request module=remote op=get_all");
        let response = send(self.client.get(self.collection_url())).await?;
        decode_json(response).await
    }

    async fn create(&self, draft: &NoteDraft) -> ApiResult<Note> {
        debug!("event=api_request module=remote op=create");
        let request = self.authorize(self.client.post(self.collection_url()).json(draft));
        decode_json(send(request).await?).await
    }

    async fn update(&self, id: &NoteId, note: &Note) -> ApiResult<Option<Note>> {
        debug!("event=api_request module=remote op=update note_id={id}");
        let request = self.authorize(self.client.put(self.note_url(id)).json(note));
        let response = send(request).await?;
        let status = response.status();
        let body = read_body(response).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<Note>>(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn delete(&self, id: &NoteId) -> ApiResult<()> {
        debug!("event=api_request module=remote op=delete note_id={id}");
        let request = self.authorize(self.client.delete(self.note_url(id)));
        let response = send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = read_body(response).await?;
        Err(classify_failure(status.as_u16(), &body))
    }

    fn set_token(&self, token: Option<&str>) {
        *self.token.write() = token.map(str::to_string);
    }
}

/// Auth store client for the `/api/login` endpoint.
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl HttpAuthApi {
    /// `default_ttl` stamps an expiration when the server does not send one.
    pub fn new(base_url: &str, timeout: Duration, default_ttl: Duration) -> ApiResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: normalize_base_url(base_url),
            default_ttl,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn session_from(&self, response: LoginResponse) -> Session {
        let expiration_time = response.expiration_time.unwrap_or_else(|| {
            let ttl_ms = i64::try_from(self.default_ttl.as_millis()).unwrap_or(i64::MAX);
            self.clock.now_ms().saturating_add(ttl_ms)
        });
        Session {
            username: response.username,
            name: response.name,
            token: response.token,
            expiration_time,
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        debug!(
            "event=api_request module=remote op=login username={}",
            credentials.username
        );
        let url = format!("{}{LOGIN_PATH}", self.base_url);
        let response = send(self.client.post(url).json(credentials)).await?;
        let login: LoginResponse = decode_json(response).await?;
        Ok(self.session_from(login))
    }
}

/// Maps a non-success status and body onto the typed failure union.
///
/// The server's `error` field is preferred; the canonical status reason is the
/// fallback when the body carries no usable text.
pub fn classify_failure(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .ok()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        401 => ApiError::Unauthorized(message),
        404 => ApiError::NotFound,
        _ => ApiError::Rejected { status, message },
    }
}

fn build_client(timeout: Duration) -> ApiResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ApiError::Transport(err.to_string()))
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

async fn send(request: RequestBuilder) -> ApiResult<Response> {
    request.send().await.map_err(|err| {
        warn!("event=api_request module=remote status=error error_code=transport error={err}");
        ApiError::Transport(err.to_string())
    })
}

async fn read_body(response: Response) -> ApiResult<String> {
    response
        .text()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = read_body(response).await?;
    if !status.is_success() {
        return Err(classify_failure(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{classify_failure, normalize_base_url, HttpAuthApi, HttpNoteApi, LoginResponse};
    use crate::clock::FixedClock;
    use crate::model::note::NoteId;
    use crate::remote::{ApiError, NoteApi};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn unauthorized_keeps_server_text() {
        let err = classify_failure(401, r#"{"error":"token expired"}"#);
        assert_eq!(err, ApiError::Unauthorized("token expired".to_string()));
        assert!(err.is_token_failure());
    }

    #[test]
    fn rejected_falls_back_to_status_reason() {
        let err = classify_failure(500, "<html>oops</html>");
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 500,
                message: "Internal Server Error".to_string()
            }
        );
    }

    #[test]
    fn validation_error_text_is_surfaced_verbatim() {
        let body = r#"{"error":"Note validation failed: content: Path `content` is shorter than the minimum allowed length (5)."}"#;
        let err = classify_failure(400, body);
        assert!(err.message().starts_with("Note validation failed"));
    }

    #[test]
    fn not_found_maps_to_not_found() {
        assert_eq!(classify_failure(404, ""), ApiError::NotFound);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(normalize_base_url(" http://h:3001/ "), "http://h:3001");
        let api = HttpNoteApi::new("http://h:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.note_url(&NoteId::from(4)), "http://h:3001/api/notes/4");
    }

    #[test]
    fn set_token_attaches_and_clears() {
        let api = HttpNoteApi::new("http://h", Duration::from_secs(1)).unwrap();
        api.set_token(Some("abc"));
        assert!(api.has_token());
        api.set_token(None);
        assert!(!api.has_token());
    }

    #[test]
    fn login_without_expiration_gets_default_ttl() {
        let auth = HttpAuthApi::new("http://h", Duration::from_secs(1), Duration::from_secs(60))
            .unwrap()
            .with_clock(Arc::new(FixedClock::new(1_000)));
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"t","username":"root","name":"Superuser"}"#).unwrap();

        let session = auth.session_from(response);
        assert_eq!(session.expiration_time, 61_000);
        assert_eq!(session.name, "Superuser");
    }

    #[test]
    fn login_with_expiration_keeps_server_value() {
        let auth =
            HttpAuthApi::new("http://h", Duration::from_secs(1), Duration::from_secs(60)).unwrap();
        let response: LoginResponse = serde_json::from_str(
            r#"{"token":"t","username":"root","name":"S","expirationTime":42}"#,
        )
        .unwrap();

        assert_eq!(auth.session_from(response).expiration_time, 42);
    }
}
