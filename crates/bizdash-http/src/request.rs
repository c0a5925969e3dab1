//! Replayable request description and buffered response.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use bizdash_core::Result;
use bizdash_core::error::{InvalidInputError, ProtocolError};

/// Whether the authenticator may decorate a request with the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Attach the stored access token, if there is one.
    #[default]
    Bearer,
    /// Never attach a token. Used by credential-issuing calls.
    Anonymous,
}

/// Which attempt of a logical request is on the wire.
///
/// Threaded through the retry path by value; a replay is built with
/// [`AttemptState::replay`] and is never eligible for another refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptState {
    pub retried: bool,
}

impl AttemptState {
    /// The original send.
    pub fn first() -> Self {
        Self { retried: false }
    }

    /// The single replay after a refresh.
    pub fn replay() -> Self {
        Self { retried: true }
    }
}

/// Everything needed to issue a request, and to issue it again with a new
/// token.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    auth: AuthMode,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: AuthMode::Bearer,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serializable: {}", e),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Mark the request as one that must never carry a bearer token.
    pub fn anonymous(mut self) -> Self {
        self.auth = AuthMode::Anonymous;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn auth(&self) -> AuthMode {
        self.auth
    }
}

/// A successful response with its body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub(crate) fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ProtocolError::invalid_body(self.status.as_u16(), e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_set_method_and_default_to_bearer() {
        let request = ApiRequest::delete("expense/3/");
        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(request.path(), "expense/3/");
        assert_eq!(request.auth(), AuthMode::Bearer);
        assert!(request.body().is_none());
    }

    #[test]
    fn anonymous_and_body() {
        let request = ApiRequest::post("auth/login/")
            .anonymous()
            .with_json(&json!({"username": "alice"}))
            .unwrap()
            .with_query("year", "2025");

        assert_eq!(request.auth(), AuthMode::Anonymous);
        assert_eq!(request.body(), Some(&json!({"username": "alice"})));
        assert_eq!(
            request.query(),
            &[("year".to_string(), "2025".to_string())]
        );
    }

    #[test]
    fn attempt_states() {
        assert!(!AttemptState::first().retried);
        assert!(AttemptState::replay().retried);
        assert_eq!(AttemptState::default(), AttemptState::first());
    }

    #[test]
    fn response_json_decode_error_keeps_status() {
        let response = ApiResponse::new(StatusCode::OK, b"<html>".to_vec());
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert_eq!(response.text(), "<html>");
    }
}
