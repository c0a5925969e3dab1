//! Sign-out notification.

use tracing::warn;

use crate::error::AuthError;

/// Receives the forced sign-out that follows an unrecoverable auth failure.
///
/// This is where an application sends the user back to its sign-in entry
/// point. It is called at most once per authenticated period.
pub trait SignOutHandler: Send + Sync {
    fn signed_out(&self, reason: &AuthError);
}

impl<F> SignOutHandler for F
where
    F: Fn(&AuthError) + Send + Sync,
{
    fn signed_out(&self, reason: &AuthError) {
        self(reason)
    }
}

/// Default handler: records the sign-out in the log and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSignOut;

impl SignOutHandler for LogSignOut {
    fn signed_out(&self, reason: &AuthError) {
        warn!(%reason, "Session terminated, sign-in required");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn closures_are_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = move |_: &AuthError| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        handler.signed_out(&AuthError::MissingRefreshToken);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
