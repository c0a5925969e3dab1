//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the backend REST API, e.g. `https://example.com/api`.
///
/// Network URLs must use HTTPS, or HTTP for localhost.
///
/// # Example
///
/// ```
/// use bizdash_core::ApiUrl;
///
/// let api = ApiUrl::new("http://localhost:8000/api/").unwrap();
/// assert_eq!(api.endpoint("token/refresh/"), "http://localhost:8000/api/token/refresh/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let mut url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: drop the trailing slash so endpoint joining is uniform
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint path relative to the API root.
    ///
    /// Leading slashes on `path` are ignored; a trailing slash is preserved
    /// since the backend routes depend on it.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://dashboard.example.com/api").unwrap();
        assert_eq!(api.host(), Some("dashboard.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://localhost:8000/api").unwrap();
        assert_eq!(api.host(), Some("localhost"));
    }

    #[test]
    fn endpoint_construction() {
        let api = ApiUrl::new("https://dashboard.example.com/api").unwrap();
        assert_eq!(
            api.endpoint("/auth/login/"),
            "https://dashboard.example.com/api/auth/login/"
        );
        assert_eq!(
            api.endpoint("product/list/"),
            "https://dashboard.example.com/api/product/list/"
        );
    }

    #[test]
    fn normalizes_trailing_slash() {
        let api = ApiUrl::new("https://dashboard.example.com/api/").unwrap();
        assert_eq!(
            api.endpoint("token/refresh/"),
            "https://dashboard.example.com/api/token/refresh/"
        );
    }

    #[test]
    fn root_base_url() {
        let api = ApiUrl::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(api.endpoint("expense/"), "http://127.0.0.1:9000/expense/");
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://dashboard.example.com/api").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api").is_err());
    }

    #[test]
    fn invalid_scheme() {
        assert!(ApiUrl::new("ftp://dashboard.example.com").is_err());
    }
}
