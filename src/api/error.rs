use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure classification for gateway calls.
///
/// `NoCredential` and `Unauthorized` both mean the caller must route the
/// user back to the sign-in screen; `RequestFailed` covers everything
/// else (bad status, unparseable body, network failure) and leaves the
/// session alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("no session token stored - sign in required")]
    NoCredential,

    #[error("session rejected by the server - sign in again")]
    Unauthorized,

    #[error("{0}")]
    RequestFailed(String),
}

/// Error body shape used by the gateway backend
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl ApiError {
    /// Classify a non-2xx response. A 401 always maps to `Unauthorized`
    /// regardless of body; anything else carries the body's `detail`
    /// field when present, or a generic fallback.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { detail: Some(detail) }) if !detail.is_empty() => {
                ApiError::RequestFailed(detail)
            }
            _ => ApiError::RequestFailed(format!("request failed with status {}", status)),
        }
    }

    /// A request that produced no response at all. Never evidence the
    /// credential was rejected, so never `Unauthorized`.
    pub fn network(err: reqwest::Error) -> Self {
        ApiError::RequestFailed(format!("network error: {}", err))
    }

    /// True when the caller must transition back to the sign-in screen.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::NoCredential | ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_is_unauthorized_regardless_of_body() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail":"token expired"}"#);
        assert_eq!(err, ApiError::Unauthorized);

        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "not even json");
        assert_eq!(err, ApiError::Unauthorized);
    }

    #[test]
    fn test_detail_field_is_extracted() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"boom"}"#);
        assert_eq!(err, ApiError::RequestFailed("boom".to_string()));
    }

    #[test]
    fn test_fallback_message_when_body_is_unparseable() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(
            err,
            ApiError::RequestFailed("request failed with status 502 Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_forbidden_does_not_count_as_unauthorized() {
        // Only a 401 tears the session down; a 403 is an ordinary failure
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "{}");
        assert!(!err.is_auth_failure());
    }
}
