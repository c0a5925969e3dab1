//! Picks the bearer token for outgoing requests.

use std::sync::Arc;

use tracing::{trace, warn};

use bizdash_core::{AccessToken, CredentialStore};

use crate::request::{ApiRequest, AuthMode};

/// Reads the current access token from the store for each request.
///
/// Never fails: an unreadable store is logged and the request goes out
/// without credentials, which the backend answers like any anonymous call.
pub(crate) struct RequestAuthenticator {
    store: Arc<dyn CredentialStore>,
}

impl RequestAuthenticator {
    pub(crate) fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// The token to attach to `request`, if any.
    pub(crate) fn token_for(&self, request: &ApiRequest) -> Option<AccessToken> {
        if request.auth() == AuthMode::Anonymous {
            return None;
        }

        match self.store.get() {
            Ok(session) => {
                let token = session.access_token().cloned();
                if token.is_none() {
                    trace!(path = request.path(), "No access token stored");
                }
                token
            }
            Err(e) => {
                warn!(error = %e, "Could not read stored session, sending without credentials");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdash_core::error::{Error, StorageError};
    use bizdash_core::{MemoryCredentialStore, RefreshToken, Result, Session};

    struct BrokenStore;

    impl CredentialStore for BrokenStore {
        fn get(&self) -> Result<Session> {
            Err(Error::Storage(StorageError::Corrupt {
                path: "session.json".into(),
                message: "bad".to_string(),
            }))
        }

        fn set(&self, _: &Session) -> Result<()> {
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    fn store_with(access: Option<&str>) -> Arc<dyn CredentialStore> {
        Arc::new(MemoryCredentialStore::with_session(Session::from_parts(
            access.map(AccessToken::new),
            Some(RefreshToken::new("r")),
        )))
    }

    #[test]
    fn attaches_stored_token() {
        let auth = RequestAuthenticator::new(store_with(Some("a1")));
        let token = auth.token_for(&ApiRequest::get("expense/")).unwrap();
        assert_eq!(token.as_str(), "a1");
    }

    #[test]
    fn no_token_without_session() {
        let auth = RequestAuthenticator::new(store_with(None));
        assert!(auth.token_for(&ApiRequest::get("expense/")).is_none());
    }

    #[test]
    fn anonymous_requests_are_left_alone() {
        let auth = RequestAuthenticator::new(store_with(Some("a1")));
        let request = ApiRequest::post("auth/login/").anonymous();
        assert!(auth.token_for(&request).is_none());
    }

    #[test]
    fn unreadable_store_sends_without_token() {
        let auth = RequestAuthenticator::new(Arc::new(BrokenStore));
        assert!(auth.token_for(&ApiRequest::get("expense/")).is_none());
    }
}
