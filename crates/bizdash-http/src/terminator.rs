//! Forced sign-out after an unrecoverable authentication failure.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info};

use bizdash_core::error::AuthError;
use bizdash_core::{CredentialStore, SignOutHandler};

/// Clears the stored session and notifies the [`SignOutHandler`].
///
/// The handler fires once per authenticated period, however many failing
/// requests call [`terminate`](Self::terminate). A period starts with the
/// terminator (or [`rearm`](Self::rearm) after login) and again whenever a
/// session shows up in the store after a sign-out, however it got there.
pub struct SessionTerminator {
    store: Arc<dyn CredentialStore>,
    handler: Arc<dyn SignOutHandler>,
    armed: Mutex<bool>,
}

impl SessionTerminator {
    pub fn new(store: Arc<dyn CredentialStore>, handler: Arc<dyn SignOutHandler>) -> Self {
        Self {
            store,
            handler,
            armed: Mutex::new(true),
        }
    }

    /// End the session. Returns `true` for the call that actually signed out.
    pub fn terminate(&self, reason: &AuthError) -> bool {
        let signed_out = {
            let mut armed = self.lock_armed();
            let stored = self.has_stored_tokens();
            let signed_out = *armed || stored;

            if signed_out && let Err(e) = self.store.clear() {
                error!(error = %e, "Failed to clear stored session");
            }

            *armed = false;
            signed_out
        };

        if !signed_out {
            debug!(%reason, "Session already terminated");
            return false;
        }

        info!(%reason, "Session terminated");
        self.handler.signed_out(reason);
        true
    }

    /// Allow the next failure to sign out again.
    pub fn rearm(&self) {
        *self.lock_armed() = true;
    }

    /// Whether the next [`terminate`](Self::terminate) will notify the
    /// handler even if the store is empty.
    pub fn is_armed(&self) -> bool {
        *self.lock_armed()
    }

    fn lock_armed(&self) -> std::sync::MutexGuard<'_, bool> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn has_stored_tokens(&self) -> bool {
        self.store.get().is_ok_and(|session| !session.is_empty())
    }
}

impl std::fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("armed", &self.is_armed())
            .finish()
    }
}
