//! The authenticated API client.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use bizdash_core::{
    AccessToken, CredentialStore, Credentials, LogSignOut, RefreshToken, Result, Session,
    SignOutHandler, UserProfile,
};

use crate::authenticator::RequestAuthenticator;
use crate::classifier::FailureClass;
use crate::config::ClientConfig;
use crate::coordinator::RefreshCoordinator;
use crate::endpoints::LoginResponse;
use crate::refresher::HttpRefresher;
use crate::request::{ApiRequest, ApiResponse, AttemptState};
use crate::terminator::SessionTerminator;
use crate::transport::Transport;

/// REST client that keeps the session alive across access token expiry.
///
/// Cheap to clone (internal `Arc`); clones share the credential store and
/// the refresh coordinator, so a refresh triggered through one clone is
/// joined by requests made through another.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: Transport,
    store: Arc<dyn CredentialStore>,
    authenticator: RequestAuthenticator,
    coordinator: RefreshCoordinator,
    terminator: Arc<SessionTerminator>,
}

impl ApiClient {
    /// Create a client whose forced sign-outs are only logged.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::with_sign_out(config, store, Arc::new(LogSignOut))
    }

    /// Create a client that reports forced sign-outs to `handler`.
    pub fn with_sign_out(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        handler: Arc<dyn SignOutHandler>,
    ) -> Result<Self> {
        let transport = Transport::new(&config)?;
        let refresher = Arc::new(HttpRefresher::new(
            transport.clone(),
            config.refresh_path(),
        ));
        let terminator = Arc::new(SessionTerminator::new(store.clone(), handler));
        let coordinator = RefreshCoordinator::new(
            store.clone(),
            refresher,
            terminator.clone(),
            config.refresh_timeout(),
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                authenticator: RequestAuthenticator::new(store.clone()),
                config,
                transport,
                store,
                coordinator,
                terminator,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The refresh coordinator shared by every request of this client.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    /// The current stored session.
    pub fn session(&self) -> Result<Session> {
        self.inner.store.get()
    }

    /// Exchange credentials for a token pair and store it.
    ///
    /// The login call never carries a bearer token, so a rejected password
    /// surfaces as a 401 without touching the refresh machinery.
    #[instrument(skip(self, credentials), fields(api = %self.inner.config.base_url(), username = %credentials.username()))]
    pub async fn login(&self, credentials: Credentials) -> Result<Session> {
        info!("Logging in");

        let request = ApiRequest::post(self.inner.config.login_path())
            .anonymous()
            .with_json(&credentials)?;

        let response: LoginResponse = self.send(&request).await?.json()?;

        let session = Session::new(
            AccessToken::new(response.access),
            RefreshToken::new(response.refresh),
        )
        .with_user(response.user);

        self.inner.store.set(&session)?;
        self.inner.terminator.rearm();

        debug!("Session stored");
        Ok(session)
    }

    /// Forget the stored session. No sign-out notification is sent.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.inner.store.clear()
    }

    /// Refresh the access token now, sharing any refresh already in flight.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<AccessToken> {
        Ok(self.inner.coordinator.authorize(None).await?)
    }

    /// Fetch the signed-in user's profile.
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        self.get_json(self.inner.config.profile_path()).await
    }

    /// Issue a request, refreshing the session and replaying once if the
    /// access token turns out to be expired.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let inner = &self.inner;

        let token = inner.authenticator.token_for(request);
        let outgoing = inner.transport.build(request, token.as_ref())?;
        let (class, result) = inner.transport.dispatch(outgoing, AttemptState::first()).await;

        if !class.is_eligible() {
            return result;
        }

        debug!("Access token rejected, waiting for refresh");
        let fresh = inner.coordinator.authorize(token.as_ref()).await?;

        let replay = inner.transport.build(request, Some(&fresh))?;
        let (class, result) = inner.transport.dispatch(replay, AttemptState::replay()).await;

        if class == FailureClass::RetryExhausted {
            warn!("Refreshed access token was rejected as well");
        }

        result
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send(&ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = ApiRequest::post(path).with_json(body)?;
        self.send(&request).await?.json()
    }

    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = ApiRequest::put(path).with_json(body)?;
        self.send(&request).await?.json()
    }

    pub async fn patch_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = ApiRequest::patch(path).with_json(body)?;
        self.send(&request).await?.json()
    }

    /// Delete a resource; any response body is discarded.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(&ApiRequest::delete(path)).await.map(|_| ())
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api", &self.inner.config.base_url())
            .field("coordinator", &self.inner.coordinator)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
