//! Session lifecycle around the stored bearer token.
//!
//! The backend completes the OAuth exchange itself and hands the client a
//! session token as a `token` query parameter on the return redirect. From
//! that point the token is the whole session: it is presented on every
//! gateway call and dropped the moment the server rejects one.
//!
//! There is no client-side expiry. A stored token is assumed good until a
//! request comes back 401; renewal means a fresh sign-in, never a refresh.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use url::Url;

use super::store::TokenStore;

/// Query parameter carrying the session token on the return redirect
const TOKEN_PARAM: &str = "token";

/// Single source of truth for "is this client signed in" and "what
/// credential do I present".
///
/// Only this type writes to token storage; the fetch gateway holds a
/// shared handle and calls `invalidate` when the server rejects the
/// credential.
pub struct SessionManager {
    store: Box<dyn TokenStore>,
}

impl SessionManager {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// The persisted token, if any. A storage read failure is treated as
    /// "logged out" rather than an error - the worst case is an extra
    /// trip through the sign-in flow.
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session token");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Complete a sign-in from the URL the identity provider redirected
    /// back to.
    ///
    /// Returns true and persists the token if the URL carries a `token`
    /// parameter; otherwise returns false and leaves any prior token
    /// untouched. Calling this twice with the same URL lands in the same
    /// state.
    pub fn complete_login_from_return_url(&self, url: &Url) -> Result<bool> {
        let token = url
            .query_pairs()
            .find(|(name, value)| name == TOKEN_PARAM && !value.is_empty())
            .map(|(_, value)| value.into_owned());

        match token {
            Some(token) => {
                self.store
                    .save(&token)
                    .context("Failed to persist session token")?;
                info!("Session token stored");
                Ok(true)
            }
            None => {
                debug!(url = %url, "Return URL carried no session token");
                Ok(false)
            }
        }
    }

    /// Drop the persisted token. Idempotent - clearing an absent token is
    /// a no-op. The gateway calls this when the server rejects the
    /// credential, before the failure is reported to the caller.
    pub fn invalidate(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::MemoryStore;
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(Box::new(MemoryStore::default()))
    }

    fn return_url(suffix: &str) -> Url {
        Url::parse(&format!("http://localhost:5173/mail{}", suffix)).unwrap()
    }

    #[test]
    fn test_complete_login_persists_token() {
        let session = manager();
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());

        let completed = session
            .complete_login_from_return_url(&return_url("?token=tok-123"))
            .unwrap();

        assert!(completed);
        assert_eq!(session.token(), Some("tok-123".to_string()));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_complete_login_is_idempotent() {
        let session = manager();
        let url = return_url("?token=tok-123");

        assert!(session.complete_login_from_return_url(&url).unwrap());
        assert!(session.complete_login_from_return_url(&url).unwrap());
        assert_eq!(session.token(), Some("tok-123".to_string()));
    }

    #[test]
    fn test_url_without_token_leaves_state_untouched() {
        let session = manager();

        assert!(!session
            .complete_login_from_return_url(&return_url(""))
            .unwrap());
        assert_eq!(session.token(), None);

        // A prior token also survives a tokenless redirect
        session
            .complete_login_from_return_url(&return_url("?token=tok-old"))
            .unwrap();
        assert!(!session
            .complete_login_from_return_url(&return_url("?error=denied"))
            .unwrap());
        assert_eq!(session.token(), Some("tok-old".to_string()));
    }

    #[test]
    fn test_empty_token_parameter_is_ignored() {
        let session = manager();
        assert!(!session
            .complete_login_from_return_url(&return_url("?token="))
            .unwrap());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let session = manager();
        session
            .complete_login_from_return_url(&return_url("?token=tok-123"))
            .unwrap();

        session.invalidate();
        assert_eq!(session.token(), None);

        // Invalidating an absent token is a no-op
        session.invalidate();
        assert_eq!(session.token(), None);
    }
}
