//! The persisted session: a token pair plus the profile returned at login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tokens::{AccessToken, RefreshToken};

/// Profile of the signed-in user, as returned alongside the login tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl UserProfile {
    /// Full name if the backend supplied one, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// The client's authentication state.
///
/// A session is meant to hold both tokens or neither. A partial session
/// (one token missing) is never [authenticated](Session::is_authenticated),
/// although the access token half is still attached to outgoing requests.
///
/// The serialized field names `access` and `refresh` are the fixed keys
/// under which the tokens are persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access: Option<AccessToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A fresh session from a token pair.
    pub fn new(access: AccessToken, refresh: RefreshToken) -> Self {
        Self {
            access: Some(access),
            refresh: Some(refresh),
            user: None,
            updated_at: Some(Utc::now()),
        }
    }

    /// The logged-out session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a session from whatever halves are available.
    pub fn from_parts(access: Option<AccessToken>, refresh: Option<RefreshToken>) -> Self {
        Self {
            access,
            refresh,
            user: None,
            updated_at: Some(Utc::now()),
        }
    }

    /// Attach the user profile.
    pub fn with_user(mut self, user: Option<UserProfile>) -> Self {
        self.user = user;
        self
    }

    /// The same session with its access token replaced, as after a refresh.
    pub fn with_access_token(mut self, access: AccessToken) -> Self {
        self.access = Some(access);
        self.updated_at = Some(Utc::now());
        self
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access.as_ref()
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh.as_ref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// When the tokens were last written.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// True only when both tokens are present.
    pub fn is_authenticated(&self) -> bool {
        self.access.is_some() && self.refresh.is_some()
    }

    /// True when neither token is present.
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 7,
            username: "alice".to_string(),
            email: None,
            first_name: Some("Alice".to_string()),
            last_name: Some("Khan".to_string()),
        }
    }

    #[test]
    fn partial_session_is_not_authenticated() {
        let session = Session::from_parts(Some(AccessToken::new("a")), None);
        assert!(!session.is_authenticated());
        assert!(!session.is_empty());
        assert_eq!(session.access_token().map(AccessToken::as_str), Some("a"));

        let session = Session::from_parts(None, Some(RefreshToken::new("r")));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn full_session_is_authenticated() {
        let session = Session::new(AccessToken::new("a"), RefreshToken::new("r"));
        assert!(session.is_authenticated());
        assert!(session.updated_at().is_some());
    }

    #[test]
    fn replacing_access_token_keeps_refresh_and_user() {
        let session = Session::new(AccessToken::new("a1"), RefreshToken::new("r"))
            .with_user(Some(profile()))
            .with_access_token(AccessToken::new("a2"));

        assert_eq!(session.access_token().unwrap().as_str(), "a2");
        assert_eq!(session.refresh_token().unwrap().as_str(), "r");
        assert_eq!(session.user().unwrap().username, "alice");
    }

    #[test]
    fn persists_under_fixed_keys() {
        let session = Session::new(AccessToken::new("a"), RefreshToken::new("r"));
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["access"], "a");
        assert_eq!(value["refresh"], "r");
        assert!(value.get("user").is_none());
    }

    #[test]
    fn empty_object_deserializes_to_logged_out() {
        let session: Session = serde_json::from_str("{}").unwrap();
        assert!(session.is_empty());
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(profile().display_name(), "Alice Khan");

        let bare = UserProfile {
            first_name: None,
            last_name: Some(String::new()),
            ..profile()
        };
        assert_eq!(bare.display_name(), "alice");
    }
}
