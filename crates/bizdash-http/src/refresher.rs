//! HTTP implementation of the refresh token exchange.

use async_trait::async_trait;
use tracing::{debug, instrument};

use bizdash_core::{AccessToken, RefreshToken, Result, TokenRefresher};

use crate::endpoints::{RefreshRequest, RefreshResponse};
use crate::request::ApiRequest;
use crate::transport::Transport;

/// `POST {base}/token/refresh/` with `{"refresh": ...}`.
///
/// Sent anonymously; the refresh token travels in the body only.
#[derive(Debug, Clone)]
pub struct HttpRefresher {
    transport: Transport,
    path: String,
}

impl HttpRefresher {
    pub(crate) fn new(transport: Transport, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    #[instrument(skip(self, refresh_token), fields(api = %self.transport.base(), path = %self.path))]
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<AccessToken> {
        let request = ApiRequest::post(self.path.as_str())
            .anonymous()
            .with_json(&RefreshRequest {
                refresh: refresh_token.as_str(),
            })?;

        let outgoing = self.transport.build(&request, None)?;
        let response: RefreshResponse = self.transport.execute(outgoing).await?.json()?;

        debug!("Refresh endpoint issued a new access token");
        Ok(AccessToken::new(response.access))
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::config::ClientConfig;
    use crate::endpoints::TOKEN_REFRESH;
    use bizdash_core::ApiUrl;
    use bizdash_core::error::{Error, TransportError};

    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn refresh_to_closed_port_is_a_connection_error() {
        let url = ApiUrl::new(format!("http://127.0.0.1:{}/api", closed_port())).unwrap();
        let transport = Transport::new(&ClientConfig::new(url)).unwrap();
        let refresher = HttpRefresher::new(transport, TOKEN_REFRESH);

        let err = refresher
            .refresh(&RefreshToken::new("r1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Transport(TransportError::Connection { .. })
        ));
    }
}
