//! Credential store trait.

use crate::Result;
use crate::session::Session;

/// Persistent home of the session tokens.
///
/// Implementations treat tokens as opaque strings and never touch the
/// network. A missing session is reported as [`Session::empty`], not as an
/// error.
pub trait CredentialStore: Send + Sync {
    /// Read the current session.
    fn get(&self) -> Result<Session>;

    /// Replace the stored session.
    fn set(&self, session: &Session) -> Result<()>;

    /// Forget both tokens and any cached profile.
    fn clear(&self) -> Result<()>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    fn get(&self) -> Result<Session> {
        (**self).get()
    }

    fn set(&self, session: &Session) -> Result<()> {
        (**self).set(session)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
