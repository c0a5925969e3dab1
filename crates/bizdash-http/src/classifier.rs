//! Decides which failed responses are worth a refresh-and-retry.

use reqwest::StatusCode;

use crate::request::AttemptState;

/// How a completed attempt is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 2xx/3xx; nothing to do.
    Success,
    /// No response arrived (connection, DNS, TLS, timeout).
    NoResponse,
    /// 401 on an authenticated first attempt: refresh and replay.
    Eligible,
    /// 401 on a request that carried no token, e.g. a bad login.
    AnonymousUnauthorized,
    /// 401 on the replay; the refreshed token was rejected as well.
    RetryExhausted,
    /// Any other error status.
    Other,
}

impl FailureClass {
    pub fn is_eligible(self) -> bool {
        self == FailureClass::Eligible
    }
}

/// Classify one attempt.
///
/// `status` is `None` when the transport produced no response.
/// `carried_authorization` reports whether the request that actually went
/// out had an `Authorization` header.
pub fn classify(
    status: Option<StatusCode>,
    carried_authorization: bool,
    attempt: AttemptState,
) -> FailureClass {
    let Some(status) = status else {
        return FailureClass::NoResponse;
    };

    if status != StatusCode::UNAUTHORIZED {
        return if status.is_client_error() || status.is_server_error() {
            FailureClass::Other
        } else {
            FailureClass::Success
        };
    }

    if !carried_authorization {
        FailureClass::AnonymousUnauthorized
    } else if attempt.retried {
        FailureClass::RetryExhausted
    } else {
        FailureClass::Eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: AttemptState = AttemptState { retried: false };
    const REPLAY: AttemptState = AttemptState { retried: true };

    #[test]
    fn authenticated_first_401_is_eligible() {
        let class = classify(Some(StatusCode::UNAUTHORIZED), true, FIRST);
        assert_eq!(class, FailureClass::Eligible);
        assert!(class.is_eligible());
    }

    #[test]
    fn network_failure_is_never_eligible() {
        assert_eq!(classify(None, true, FIRST), FailureClass::NoResponse);
    }

    #[test]
    fn unauthenticated_401_is_passed_through() {
        assert_eq!(
            classify(Some(StatusCode::UNAUTHORIZED), false, FIRST),
            FailureClass::AnonymousUnauthorized
        );
    }

    #[test]
    fn replayed_401_is_final() {
        assert_eq!(
            classify(Some(StatusCode::UNAUTHORIZED), true, REPLAY),
            FailureClass::RetryExhausted
        );
    }

    #[test]
    fn other_statuses() {
        assert_eq!(
            classify(Some(StatusCode::FORBIDDEN), true, FIRST),
            FailureClass::Other
        );
        assert_eq!(
            classify(Some(StatusCode::INTERNAL_SERVER_ERROR), true, FIRST),
            FailureClass::Other
        );
        assert_eq!(
            classify(Some(StatusCode::NO_CONTENT), true, REPLAY),
            FailureClass::Success
        );
    }
}
