// Bearer token lifecycle
//
// The vendor issues tokens with a fixed 3-hour lifetime. A token is
// refreshed ahead of expiry with a 2h59m safety margin, so in practice
// every poll past the first minute of a token's life rolls it over.
// All predicates take `now` explicitly -- callers pass `Utc::now()`,
// tests pass a fixed instant.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::wire::TokenResponse;

/// Safety margin before expiry at which a token is considered stale,
/// in seconds (2 h 59 min against the vendor's 3 h lifetime).
pub const REFRESH_MARGIN_SECS: i64 = (2 * 60 + 59) * 60;

/// An OAuth2 bearer token pair issued by the Velux Active cloud.
///
/// Replaced wholesale on refresh, never mutated. `expires_at` is
/// computed once at construction from the vendor-declared lifetime.
#[derive(Clone)]
pub struct AuthToken {
    access_token: SecretString,
    refresh_token: SecretString,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Build a token from a token-endpoint response, stamped at `issued_at`.
    pub fn from_response(resp: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let lifetime = TimeDelta::seconds(resp.expires_in);
        Self {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            issued_at,
            expires_at: issued_at + lifetime,
        }
    }

    /// The bearer token sent as `access_token` in data-endpoint bodies.
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// The refresh token for the `refresh_token` grant.
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token expires within `margin` of `now` (strict).
    pub fn expires_within(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        self.expires_at < now + margin
    }

    /// Whether the token is still usable for at least `margin` past `now`.
    pub fn valid_for(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        !self.expires_within(now, margin)
    }

    /// Whether the token should be rolled over before the next request.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_within(now, TimeDelta::seconds(REFRESH_MARGIN_SECS))
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token material stays out of logs.
        f.debug_struct("AuthToken")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
