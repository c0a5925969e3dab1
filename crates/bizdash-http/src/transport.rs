//! HTTP plumbing: request building, execution and response handling.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, trace};

use bizdash_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use bizdash_core::{AccessToken, ApiUrl, Result};

use crate::classifier::{FailureClass, classify};
use crate::config::ClientConfig;
use crate::endpoints::ApiErrorBody;
use crate::request::{ApiRequest, ApiResponse, AttemptState};

/// Thin wrapper over `reqwest::Client` bound to one API root.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base: ApiUrl,
}

impl Transport {
    pub(crate) fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(transport_error)?;

        Ok(Self {
            http,
            base: config.base_url().clone(),
        })
    }

    pub(crate) fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Build the outgoing request, attaching `token` as a bearer credential.
    pub(crate) fn build(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Request> {
        let url = self.base.endpoint(request.path());
        let mut builder = self.http.request(request.method().clone(), &url);

        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&token.bearer())
                .map_err(|_| InvalidInputError::TokenEncoding)?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        builder.build().map_err(|e| {
            InvalidInputError::Path {
                value: request.path().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Send a request and classify the outcome.
    pub(crate) async fn dispatch(
        &self,
        outgoing: reqwest::Request,
        attempt: AttemptState,
    ) -> (FailureClass, Result<ApiResponse>) {
        let carried = outgoing.headers().contains_key(AUTHORIZATION);
        let method = outgoing.method().clone();
        let url = outgoing.url().clone();

        debug!(%method, %url, carried, retried = attempt.retried, "Sending request");

        match self.http.execute(outgoing).await {
            Ok(response) => {
                let status = response.status();
                let class = classify(Some(status), carried, attempt);
                trace!(%status, ?class, "Response received");
                (class, read_response(response).await)
            }
            Err(e) => {
                let class = classify(None, carried, attempt);
                debug!(error = %e, ?class, "Request failed without a response");
                (class, Err(transport_error(e)))
            }
        }
    }

    /// Send a request without classification.
    pub(crate) async fn execute(&self, outgoing: reqwest::Request) -> Result<ApiResponse> {
        self.dispatch(outgoing, AttemptState::first()).await.1
    }
}

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(err)
}

async fn read_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if status.is_success() {
        Ok(ApiResponse::new(status, body.to_vec()))
    } else {
        Err(Error::Protocol(parse_error_body(status, &body)))
    }
}

fn parse_error_body(status: StatusCode, body: &[u8]) -> ProtocolError {
    let parsed = serde_json::from_slice::<ApiErrorBody>(body).unwrap_or_default();
    ProtocolError::new(
        status.as_u16(),
        parsed.code.or(parsed.error),
        parsed.detail.or(parsed.message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_detail_and_code() {
        let err = parse_error_body(
            StatusCode::UNAUTHORIZED,
            br#"{"detail": "Token is invalid or expired", "code": "token_not_valid"}"#,
        );
        assert_eq!(err.status, 401);
        assert_eq!(err.code.as_deref(), Some("token_not_valid"));
        assert_eq!(err.message.as_deref(), Some("Token is invalid or expired"));
    }

    #[test]
    fn error_body_falls_back_to_message() {
        let err = parse_error_body(
            StatusCode::BAD_REQUEST,
            br#"{"error": "Bad", "message": "missing field"}"#,
        );
        assert_eq!(err.code.as_deref(), Some("Bad"));
        assert_eq!(err.message.as_deref(), Some("missing field"));
    }

    #[test]
    fn non_json_error_body() {
        let err = parse_error_body(StatusCode::INTERNAL_SERVER_ERROR, b"Internal Server Error");
        assert_eq!(err.status, 500);
        assert!(err.code.is_none());
        assert!(err.message.is_none());
    }

    #[test]
    fn build_attaches_bearer_and_query() {
        let config = ClientConfig::new(ApiUrl::new("https://dash.example.com/api").unwrap());
        let transport = Transport::new(&config).unwrap();
        let request = ApiRequest::get("dashboard/daily/")
            .with_query("month", "3")
            .with_query("year", "2025");

        let outgoing = transport
            .build(&request, Some(&AccessToken::new("t1")))
            .unwrap();

        assert_eq!(
            outgoing.url().as_str(),
            "https://dash.example.com/api/dashboard/daily/?month=3&year=2025"
        );
        assert_eq!(outgoing.headers()[AUTHORIZATION], "Bearer t1");
    }

    #[test]
    fn build_without_token_has_no_header() {
        let config = ClientConfig::new(ApiUrl::new("https://dash.example.com/api").unwrap());
        let transport = Transport::new(&config).unwrap();

        let outgoing = transport.build(&ApiRequest::get("expense/"), None).unwrap();
        assert!(!outgoing.headers().contains_key(AUTHORIZATION));
    }
}
