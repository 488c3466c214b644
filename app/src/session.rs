use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// True iff a non-empty token is present and `now` is strictly before `expires_at`.
pub fn is_token_valid_at(
    token: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match (token, expires_at) {
        (Some(token), Some(expires_at)) => !token.is_empty() && now < expires_at,
        _ => false,
    }
}

pub fn is_token_valid(token: Option<&str>, expires_at: Option<DateTime<Utc>>) -> bool {
    is_token_valid_at(token, expires_at, Utc::now())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: String, ttl: Duration) -> Self {
        Self::with_expiry(token, Utc::now() + ttl)
    }

    pub fn with_expiry(token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: Some(token),
            expires_at: Some(expires_at),
        }
    }

    pub fn is_valid(&self) -> bool {
        is_token_valid(self.token.as_deref(), self.expires_at)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.expires_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_gate_boundaries() {
        let now = Utc::now();
        let later = now + Duration::seconds(1);

        assert!(is_token_valid_at(Some("abc"), Some(later), now));
        assert!(!is_token_valid_at(Some("abc"), Some(now), now));
        assert!(!is_token_valid_at(Some("abc"), Some(now - Duration::seconds(1)), now));
        assert!(!is_token_valid_at(None, Some(later), now));
        assert!(!is_token_valid_at(Some("abc"), None, now));
        assert!(!is_token_valid_at(Some(""), Some(later), now));
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = Session::new("token".into(), Duration::minutes(10));
        assert!(session.is_valid());
        assert_eq!(session.token(), Some("token"));

        session.clear();
        assert!(!session.is_valid());
        assert_eq!(session, Session::default());
    }

    #[test]
    fn test_expired_session_is_invalid() {
        let session = Session::with_expiry("token".into(), Utc::now() - Duration::seconds(5));
        assert!(!session.is_valid());
    }
}
