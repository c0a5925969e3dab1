//! In-memory credential store.

use std::sync::{PoisonError, RwLock};

use tracing::trace;

use crate::Result;
use crate::session::Session;
use crate::traits::CredentialStore;

/// A [`CredentialStore`] that lives only as long as the process.
///
/// Useful for embedding the client in a long-running service and as a
/// test double.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: RwLock<Session>,
}

impl MemoryCredentialStore {
    /// An empty (logged-out) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Session> {
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        Ok(session.clone())
    }

    fn set(&self, session: &Session) -> Result<()> {
        trace!("Storing session in memory");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        trace!("Clearing in-memory session");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Session::empty();
        Ok(())
    }
}
