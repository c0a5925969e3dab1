//! Single-flight token refresh.
//!
//! The coordinator owns the only [`RefreshState`]. The first caller that
//! needs a new access token starts a refresh cycle in its own task; every
//! caller that arrives while the cycle is running waits on the same shared
//! outcome. A cycle settles exactly once: on success the new token is
//! written to the store before any waiter sees it, on failure the session
//! is terminated before any waiter sees the error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::{debug, info, instrument, trace, warn};

use bizdash_core::error::{AuthError, Error};
use bizdash_core::{AccessToken, CredentialStore, RefreshToken, TokenRefresher};

use crate::terminator::SessionTerminator;

type RefreshOutcome = Result<AccessToken, AuthError>;
type SharedOutcome = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    Idle,
    Refreshing {
        cycle: u64,
        waiters: usize,
        outcome: SharedOutcome,
    },
}

enum Joined {
    /// The store already holds a newer token than the one that failed.
    Ready(AccessToken),
    Wait(u64, SharedOutcome),
}

/// Guarantees at most one refresh call in flight.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    state: Mutex<RefreshState>,
    cycles: AtomicU64,
    /// Bumped under the state lock on every start and settle.
    epoch: AtomicU64,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    terminator: Arc<SessionTerminator>,
    timeout: Option<Duration>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        terminator: Arc<SessionTerminator>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                state: Mutex::new(RefreshState::Idle),
                cycles: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                store,
                refresher,
                terminator,
                timeout,
            }),
        }
    }

    /// Obtain an access token to replace `stale`.
    ///
    /// `stale` is the token the failed request carried, or `None` to force
    /// a refresh. Concurrent callers share one refresh cycle and all observe
    /// its outcome. If the store already holds a token other than `stale`,
    /// that token is returned without a refresh.
    #[instrument(skip_all)]
    pub async fn authorize(&self, stale: Option<&AccessToken>) -> Result<AccessToken, AuthError> {
        match self.join_or_start(stale) {
            Joined::Ready(token) => Ok(token),
            Joined::Wait(cycle, outcome) => {
                let result = outcome.await;
                debug!(cycle, ok = result.is_ok(), "Observed refresh outcome");
                result
            }
        }
    }

    /// True while a refresh cycle is in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.inner.lock_state(), RefreshState::Refreshing { .. })
    }

    /// Number of refresh cycles started so far.
    pub fn cycles_started(&self) -> u64 {
        self.inner.cycles.load(Ordering::SeqCst)
    }

    fn join_or_start(&self, stale: Option<&AccessToken>) -> Joined {
        loop {
            // The store is read outside the state lock; a store may block.
            let epoch = self.inner.epoch.load(Ordering::SeqCst);
            let current = stale.and_then(|_| self.inner.stored_access_token());

            let mut state = self.inner.lock_state();

            if let RefreshState::Refreshing {
                cycle,
                waiters,
                outcome,
            } = &mut *state
            {
                *waiters += 1;
                debug!(cycle = *cycle, waiters = *waiters, "Joining in-flight token refresh");
                return Joined::Wait(*cycle, outcome.clone());
            }

            if self.inner.epoch.load(Ordering::SeqCst) != epoch {
                trace!("Refresh state changed while reading the store, retrying");
                continue;
            }

            if let Some(stale) = stale
                && let Some(current) = current
                && current != *stale
            {
                debug!("Stored access token already replaced, skipping refresh");
                return Joined::Ready(current);
            }

            let cycle = self.inner.cycles.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            info!(cycle, "Starting token refresh");

            let guard = CycleGuard::new(self.inner.clone(), cycle);
            let task = tokio::spawn(guard.run());
            let outcome = async move {
                task.await.unwrap_or_else(|e| {
                    Err(AuthError::RefreshFailed {
                        message: format!("refresh task did not complete: {}", e),
                    })
                })
            }
            .boxed()
            .shared();

            *state = RefreshState::Refreshing {
                cycle,
                waiters: 1,
                outcome: outcome.clone(),
            };

            return Joined::Wait(cycle, outcome);
        }
    }
}

/// Owns one refresh cycle and settles it when dropped.
///
/// A cycle whose task panics or is aborted never reaches its outcome; the
/// guard then terminates the session before returning the state to idle.
struct CycleGuard {
    inner: Arc<CoordinatorInner>,
    cycle: u64,
    finished: bool,
}

impl CycleGuard {
    fn new(inner: Arc<CoordinatorInner>, cycle: u64) -> Self {
        Self {
            inner,
            cycle,
            finished: false,
        }
    }

    async fn run(mut self) -> RefreshOutcome {
        let outcome = self.inner.run_cycle(self.cycle).await;
        self.finished = true;
        outcome
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if !self.finished {
            let reason = AuthError::RefreshFailed {
                message: "refresh did not complete".to_string(),
            };
            warn!(cycle = self.cycle, "Token refresh abandoned");
            self.inner.terminator.terminate(&reason);
        }
        self.inner.settle(self.cycle);
    }
}

impl CoordinatorInner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stored_access_token(&self) -> Option<AccessToken> {
        match self.store.get() {
            Ok(session) => session.access_token().cloned(),
            Err(e) => {
                warn!(error = %e, "Could not read stored session");
                None
            }
        }
    }

    /// Exchange the refresh token and apply the result. Settling is left to
    /// the [`CycleGuard`].
    async fn run_cycle(&self, cycle: u64) -> RefreshOutcome {
        match self.exchange().await {
            Ok((used, access)) => {
                self.persist(&used, &access);
                info!(cycle, "Token refresh succeeded");
                Ok(access)
            }
            Err(reason) => {
                warn!(cycle, %reason, "Token refresh failed");
                self.terminator.terminate(&reason);
                Err(reason)
            }
        }
    }

    async fn exchange(&self) -> Result<(RefreshToken, AccessToken), AuthError> {
        let refresh_token = match self.store.get() {
            Ok(session) => session.refresh_token().cloned(),
            Err(e) => {
                warn!(error = %e, "Could not read stored session");
                None
            }
        };

        let Some(refresh_token) = refresh_token else {
            return Err(AuthError::MissingRefreshToken);
        };

        let call = self.refresher.refresh(&refresh_token);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AuthError::RefreshTimeout {
                    duration_ms: limit.as_millis() as u64,
                }
            })?,
            None => call.await,
        };

        let access = result.map_err(refresh_failure)?;
        Ok((refresh_token, access))
    }

    /// Write the new access token unless the session changed underneath us.
    fn persist(&self, used: &RefreshToken, access: &AccessToken) {
        let session = match self.store.get() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Could not read session to store refreshed token");
                return;
            }
        };

        if session.refresh_token() != Some(used) {
            debug!("Session replaced during refresh, not storing refreshed token");
            return;
        }

        if let Err(e) = self.store.set(&session.with_access_token(access.clone())) {
            warn!(error = %e, "Failed to store refreshed access token");
        }
    }

    fn settle(&self, cycle: u64) {
        let mut state = self.lock_state();
        let waiters = match &*state {
            RefreshState::Refreshing {
                cycle: current,
                waiters,
                ..
            } if *current == cycle => *waiters,
            _ => return,
        };

        debug!(cycle, waiters, "Refresh cycle settled");
        *state = RefreshState::Idle;
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

fn refresh_failure(err: Error) -> AuthError {
    match err {
        Error::Protocol(err) if !(200..300).contains(&err.status) => {
            AuthError::RefreshRejected(err)
        }
        Error::Auth(err) => err,
        other => AuthError::RefreshFailed {
            message: other.to_string(),
        },
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("cycles_started", &self.cycles_started())
            .finish()
    }
}
