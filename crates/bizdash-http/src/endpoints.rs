//! Backend endpoint paths and wire types.

use serde::{Deserialize, Serialize};

use bizdash_core::UserProfile;

/// Exchanges a username and password for a token pair.
pub const LOGIN: &str = "auth/login/";

/// Exchanges a refresh token for a new access token.
pub const TOKEN_REFRESH: &str = "token/refresh/";

/// The signed-in user's profile.
pub const PROFILE: &str = "auth/profile/";

/// Response from the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Request body for the refresh endpoint.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from the refresh endpoint. A rotated `refresh` field, if the
/// backend sends one, is ignored.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Error body shape used by the backend (`detail`/`code`), with the generic
/// `message`/`error` pair as a fallback.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
