//! API client for the mayl mail gateway.
//!
//! This module provides the `ApiClient` struct: a thin policy wrapper
//! around outbound HTTP calls that enforces the session contract in one
//! place. Every protected call reads the stored token, attaches it as a
//! bearer header, and classifies the response; a rejected credential is
//! removed from storage here, not by each caller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::auth::SessionManager;
use crate::models::{MessageDetail, MessagesResponse};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow Gmail proxy responses while failing fast enough
/// for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size requested from the message list endpoint
const DEFAULT_MAX_RESULTS: u32 = 50;

#[derive(Debug, Deserialize)]
struct OauthUrlResponse {
    authorization_url: String,
}

/// API client for the mail gateway.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the session handle is shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    /// Create a new API client against the given gateway base URL
    pub fn new(base_url: &str, session: Arc<SessionManager>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Fetch the identity provider's authorization URL from the backend.
    /// The one call made without a credential.
    pub async fn get_oauth_url(&self) -> Result<String, ApiError> {
        let url = format!("{}/api/auth/oauth-url", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let parsed: OauthUrlResponse = response
            .json()
            .await
            .map_err(|e| ApiError::RequestFailed(format!("failed to parse OAuth URL response: {}", e)))?;
        Ok(parsed.authorization_url)
    }

    /// Fetch the message list, scoped by a Gmail search query
    /// (empty for the whole inbox).
    pub async fn fetch_messages(&self, query: &str) -> Result<MessagesResponse, ApiError> {
        let params = [
            ("query", query.to_string()),
            ("max_results", DEFAULT_MAX_RESULTS.to_string()),
        ];
        self.authed_get("/api/gmail/messages", &params).await
    }

    /// Fetch the full detail (decoded body included) for one message
    pub async fn fetch_message(&self, id: &str) -> Result<MessageDetail, ApiError> {
        self.authed_get(&format!("/api/gmail/message/{}", id), &[])
            .await
    }

    /// Perform an authenticated GET against the gateway.
    ///
    /// The single enforcement point for the session contract:
    /// - no stored token: fail `NoCredential` without touching the network
    /// - 401: clear the stored token, then fail `Unauthorized` - by the
    ///   time the caller sees the error the credential is already gone
    /// - other non-2xx: fail `RequestFailed`, session untouched
    /// - 2xx: parsed payload
    ///
    /// No retry happens here; the caller decides whether to re-invoke.
    async fn authed_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let token = self.session.token().ok_or(ApiError::NoCredential)?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "Credential rejected, clearing stored session");
            self.session.invalidate();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(path, status = %status, "Request failed");
            return Err(ApiError::from_status(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::RequestFailed(format!("failed to parse response from {}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStore, SessionManager};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tiny_http::{Header, Response, Server, StatusCode as HttpStatus};
    use url::Url;

    struct FakeBackend {
        base_url: String,
        hits: Arc<AtomicUsize>,
        auth_header: Arc<Mutex<Option<String>>>,
    }

    /// Serve one canned response on an ephemeral port and record what
    /// the client sent.
    fn spawn_backend(status: u16, body: &'static str) -> FakeBackend {
        let server = Server::http("127.0.0.1:0").expect("failed to bind test server");
        let port = server.server_addr().to_ip().expect("no ip address").port();

        let hits = Arc::new(AtomicUsize::new(0));
        let auth_header = Arc::new(Mutex::new(None));
        let thread_hits = Arc::clone(&hits);
        let thread_auth = Arc::clone(&auth_header);

        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                thread_hits.fetch_add(1, Ordering::SeqCst);
                *thread_auth.lock().unwrap() = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());

                let response = Response::from_string(body)
                    .with_status_code(HttpStatus(status))
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        FakeBackend {
            base_url: format!("http://127.0.0.1:{}", port),
            hits,
            auth_header,
        }
    }

    fn session_with_token(token: Option<&str>) -> Arc<SessionManager> {
        let session = Arc::new(SessionManager::new(Box::new(MemoryStore::default())));
        if let Some(token) = token {
            let url = Url::parse(&format!("http://localhost:5173/mail?token={}", token)).unwrap();
            session.complete_login_from_return_url(&url).unwrap();
        }
        session
    }

    const MESSAGES_BODY: &str = r#"{
        "messages": [{
            "id": "m1",
            "snippet": "see you tomorrow",
            "internalDate": "1700000000000",
            "labelIds": ["INBOX", "UNREAD"],
            "payload": {
                "headers": [
                    {"name": "From", "value": "Ada Lovelace <ada@example.com>"},
                    {"name": "Subject", "value": "Lunch?"}
                ]
            }
        }],
        "total_count": 1
    }"#;

    #[tokio::test]
    async fn test_missing_token_never_touches_the_network() {
        let backend = spawn_backend(200, MESSAGES_BODY);
        let session = session_with_token(None);
        let api = ApiClient::new(&backend.base_url, session).unwrap();

        let err = api.fetch_messages("").await.unwrap_err();
        assert_eq!(err, ApiError::NoCredential);
        assert_eq!(backend.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_clears_the_stored_session() {
        let backend = spawn_backend(401, r#"{"detail":"invalid token"}"#);
        let session = session_with_token(Some("tok-123"));
        let api = ApiClient::new(&backend.base_url, Arc::clone(&session)).unwrap();

        let err = api.fetch_messages("").await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);

        // Invalidation completed before the error was reported
        assert_eq!(session.token(), None);
        assert_eq!(backend.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_reports_detail_and_keeps_the_session() {
        let backend = spawn_backend(500, r#"{"detail":"boom"}"#);
        let session = session_with_token(Some("tok-123"));
        let api = ApiClient::new(&backend.base_url, Arc::clone(&session)).unwrap();

        let err = api.fetch_messages("").await.unwrap_err();
        assert_eq!(err, ApiError::RequestFailed("boom".to_string()));
        assert_eq!(session.token(), Some("tok-123".to_string()));
    }

    #[tokio::test]
    async fn test_success_returns_payload_with_bearer_attached() {
        let backend = spawn_backend(200, MESSAGES_BODY);
        let session = session_with_token(Some("tok-123"));
        let api = ApiClient::new(&backend.base_url, Arc::clone(&session)).unwrap();

        let response = api.fetch_messages("in:inbox").await.unwrap();
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].id, "m1");
        assert_eq!(response.total_count, Some(1));

        assert_eq!(
            backend.auth_header.lock().unwrap().as_deref(),
            Some("Bearer tok-123")
        );
        assert_eq!(session.token(), Some("tok-123".to_string()));
    }

    #[tokio::test]
    async fn test_oauth_url_endpoint_needs_no_credential() {
        let backend = spawn_backend(
            200,
            r#"{"authorization_url":"https://accounts.google.com/o/oauth2/auth?state=x"}"#,
        );
        let session = session_with_token(None);
        let api = ApiClient::new(&backend.base_url, session).unwrap();

        let url = api.get_oauth_url().await.unwrap();
        assert!(url.starts_with("https://accounts.google.com/"));
        assert_eq!(*backend.auth_header.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_a_request_failure() {
        let backend = spawn_backend(200, "not json");
        let session = session_with_token(Some("tok-123"));
        let api = ApiClient::new(&backend.base_url, Arc::clone(&session)).unwrap();

        let err = api.fetch_messages("").await.unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed(_)));
        // A garbled body is not a rejection; the session survives
        assert_eq!(session.token(), Some("tok-123".to_string()));
    }
}
