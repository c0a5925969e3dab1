//! Client configuration.

use std::time::Duration;

use bizdash_core::ApiUrl;

use crate::endpoints::{LOGIN, PROFILE, TOKEN_REFRESH};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Upper bound on a single token refresh call, and therefore on how long a
/// queued request waits for it.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport timeout applied to every other request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: ApiUrl,
    login_path: String,
    refresh_path: String,
    profile_path: String,
    request_timeout: Option<Duration>,
    refresh_timeout: Option<Duration>,
    user_agent: String,
}

impl ClientConfig {
    /// Defaults for the given API root.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            login_path: LOGIN.to_string(),
            refresh_path: TOKEN_REFRESH.to_string(),
            profile_path: PROFILE.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            refresh_timeout: Some(DEFAULT_REFRESH_TIMEOUT),
            user_agent: concat!("bizdash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Override the login endpoint path.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Override the token refresh endpoint path.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Override the profile endpoint path.
    pub fn with_profile_path(mut self, path: impl Into<String>) -> Self {
        self.profile_path = path.into();
        self
    }

    /// Transport timeout for ordinary requests. `None` disables it.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Bound on the refresh call. `None` waits indefinitely.
    pub fn with_refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    pub fn profile_path(&self) -> &str {
        &self.profile_path
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        self.refresh_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_backend_routes() {
        let config = ClientConfig::new(ApiUrl::new(DEFAULT_API_URL).unwrap());
        assert_eq!(config.login_path(), "auth/login/");
        assert_eq!(config.refresh_path(), "token/refresh/");
        assert_eq!(config.refresh_timeout(), Some(DEFAULT_REFRESH_TIMEOUT));
        assert!(config.user_agent().starts_with("bizdash/"));
    }

    #[test]
    fn overrides_apply() {
        let config = ClientConfig::new(ApiUrl::new(DEFAULT_API_URL).unwrap())
            .with_refresh_path("auth/token/refresh/")
            .with_refresh_timeout(None);
        assert_eq!(config.refresh_path(), "auth/token/refresh/");
        assert_eq!(config.refresh_timeout(), None);
    }
}
