//! Token refresher trait.

use async_trait::async_trait;

use crate::Result;
use crate::tokens::{AccessToken, RefreshToken};

/// Performs the network exchange of a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange `refresh_token` for a fresh access token.
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<AccessToken>;
}
