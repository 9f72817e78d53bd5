//! OAuth token pair.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Refresh this long before Spotify says the token expires.
const EXPIRY_MARGIN: TimeDelta = TimeDelta::seconds(30);

/// Saved tokens older than this are refreshed before use.
const MAX_TOKEN_AGE: TimeDelta = TimeDelta::hours(24);

/// Upper bound on the lifetime accepted from the accounts service.
const MAX_EXPIRES_IN_SECS: i64 = 86_400;

/// Access and refresh tokens returned by the Spotify accounts service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub obtained_at: DateTime<Utc>,
}

impl Tokens {
    /// Build tokens from a token endpoint response received at `now`.
    ///
    /// `expires_in_secs` is clamped to `0..=86_400`.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let lifetime = TimeDelta::seconds(expires_in_secs.clamp(0, MAX_EXPIRES_IN_SECS));
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: now.checked_add_signed(lifetime).unwrap_or(now),
            obtained_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + EXPIRY_MARGIN >= self.expires_at
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.obtained_at >= MAX_TOKEN_AGE
    }

    /// Whether the tokens can be used without talking to the accounts service.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired(now) && !self.is_stale(now)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    #[test]
    fn test_expiry_margin() {
        let tokens = Tokens::new("a", None, 3600, now());
        assert!(!tokens.is_expired(now()));
        assert!(!tokens.is_expired(now() + TimeDelta::seconds(3569)));
        assert!(tokens.is_expired(now() + TimeDelta::seconds(3570)));
    }

    #[test]
    fn test_staleness() {
        let tokens = Tokens::new("a", Some("r".into()), 3600, now());
        assert!(!tokens.is_stale(now() + TimeDelta::hours(23)));
        assert!(tokens.is_stale(now() + TimeDelta::hours(24)));
        assert!(tokens.can_refresh());
    }

    #[test]
    fn test_out_of_range_lifetime_is_clamped() {
        let tokens = Tokens::new("a", None, i64::MAX, now());
        assert_eq!(tokens.expires_at, now() + TimeDelta::hours(24));

        let tokens = Tokens::new("a", None, -5, now());
        assert_eq!(tokens.expires_at, now());
        assert!(tokens.is_expired(now()));
    }

    #[test]
    fn test_usable() {
        assert!(Tokens::new("a", None, 3600, now()).is_usable(now()));
        assert!(!Tokens::new("", None, 3600, now()).is_usable(now()));
        assert!(!Tokens::new("a", Some(String::new()), 3600, now()).can_refresh());
    }
}
