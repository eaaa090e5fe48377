// ── Runtime connection configuration ──
//
// Describes *how* to reach the Velux Active cloud for one account.
// Credential storage is the host's concern; this type only carries
// what a Hub needs at runtime and never touches disk.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use veluxa_api::DEFAULT_API_URL;

/// Configuration for one cloud account connection.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Vendor API base URL. Overridable for tests; defaults to production.
    pub api_url: Url,
    /// Account username (email).
    pub username: String,
    /// Account password. Kept for mid-poll re-authentication after a
    /// hard auth failure.
    pub password: SecretString,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// How often the background task refreshes (seconds). 0 = never;
    /// the host then drives updates through `Hub::refresh()` itself.
    pub refresh_interval_secs: u64,
}

impl HubConfig {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            ..Self::default()
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            username: String::new(),
            password: SecretString::from(String::new()),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 60,
        }
    }
}
