// Velux Active cloud HTTP client
//
// Wraps `reqwest::Client` with the vendor's form-encoded POST calling
// convention, the `{ body, status }` envelope, and transparent bearer
// token refresh. All methods return unwrapped `body` payloads.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::token::AuthToken;
use crate::transport::TransportConfig;
use crate::wire::{Envelope, HomeStatusBody, HomesBody, RawHome, RawModule, TokenResponse};

/// Production base URL of the Velux Active cloud.
pub const DEFAULT_API_URL: &str = "https://app.velux-active.com";

const TOKEN_PATH: &str = "/oauth2/token";
const HOMES_PATH: &str = "/api/gethomedata";
const HOME_STATUS_PATH: &str = "/api/homestatus";

// App credentials published with the official Velux Active app.
// Fixed per vendor; not user secrets.
const CLIENT_ID: &str = "5931426da127d981e76bdd3f";
const CLIENT_SECRET: &str = "6ae2d89d15e767ae5c56b456b452d319";
const USER_PREFIX: &str = "velux";

/// Async client for the Velux Active cloud API.
///
/// Holds the current [`AuthToken`] behind a mutex; `access_token()`
/// rolls it over ahead of expiry so data calls never carry a stale
/// bearer. The token is only ever replaced on a successful exchange.
pub struct VeluxClient {
    http: reqwest::Client,
    base_url: Url,
    token: Mutex<Option<AuthToken>>,
}

impl VeluxClient {
    /// Create a new client from a base URL and transport settings.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: Mutex::new(None),
        }
    }

    /// The vendor base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate with username/password (OAuth2 password grant).
    ///
    /// On success the token is stored and used for all subsequent data
    /// calls. Safe to call again at any time; the stored token is
    /// replaced wholesale.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthToken, Error> {
        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password.expose_secret()),
            ("user_prefix", USER_PREFIX),
            ("client_id", CLIENT_ID),
            ("client_secret", CLIENT_SECRET),
        ];

        let token = self
            .request_token(&form)
            .await
            .map_err(|e| match e {
                Error::Authentication { .. } => Error::Authentication {
                    message: "invalid username or password".into(),
                },
                other => other,
            })?;

        debug!(expires_at = %token.expires_at(), "authenticated");
        *self.token.lock().await = Some(token.clone());
        Ok(token)
    }

    /// Exchange the stored refresh token for a fresh token pair.
    ///
    /// Any failure surfaces as [`Error::Authentication`] and leaves the
    /// previously stored token in place.
    pub async fn refresh_access_token(&self) -> Result<AuthToken, Error> {
        let mut slot = self.token.lock().await;
        self.refresh_locked(&mut slot).await
    }

    /// A valid bearer token, refreshed first if it is inside the safety
    /// margin of its expiry.
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut slot = self.token.lock().await;
        let current = slot.as_ref().ok_or(Error::NotAuthenticated)?;

        if current.needs_refresh(Utc::now()) {
            let refreshed = self.refresh_locked(&mut slot).await?;
            debug!(expires_at = %refreshed.expires_at(), "refreshed access token");
            return Ok(refreshed.access_token().to_owned());
        }

        Ok(current.access_token().to_owned())
    }

    /// Refresh with the mutex already held, so the check-and-replace is
    /// atomic with respect to concurrent callers.
    async fn refresh_locked(&self, slot: &mut Option<AuthToken>) -> Result<AuthToken, Error> {
        let current = slot.as_ref().ok_or(Error::NotAuthenticated)?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token()),
            ("client_id", CLIENT_ID),
            ("client_secret", CLIENT_SECRET),
        ];

        match self.request_token(&form).await {
            Ok(token) => {
                *slot = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed; keeping previous token");
                Err(Error::Authentication {
                    message: format!("token refresh failed: {e}"),
                })
            }
        }
    }

    /// POST a grant request to the token endpoint and stamp the result.
    async fn request_token(&self, form: &[(&str, &str)]) -> Result<AuthToken, Error> {
        let url = self.base_url.join(TOKEN_PATH)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("token endpoint rejected the request (HTTP {status})"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        Ok(AuthToken::from_response(parsed, Utc::now()))
    }

    // ── Data endpoints ───────────────────────────────────────────────

    /// Fetch the list of homes visible to the account.
    pub async fn get_homes(&self) -> Result<Vec<RawHome>, Error> {
        let access_token = self.access_token().await?;
        let form = [("access_token", access_token.as_str())];
        let body: HomesBody = self.post_data(HOMES_PATH, &form).await?;
        debug!(homes = body.homes.len(), "fetched home list");
        Ok(body.homes)
    }

    /// Fetch the current module statuses for one home.
    pub async fn get_home_status(&self, home_id: &str) -> Result<Vec<RawModule>, Error> {
        let access_token = self.access_token().await?;
        let form = [
            ("access_token", access_token.as_str()),
            ("home_id", home_id),
        ];
        let body: HomeStatusBody = self.post_data(HOME_STATUS_PATH, &form).await?;
        debug!(
            home_id,
            modules = body.home.modules.len(),
            "fetched home status"
        );
        Ok(body.home.modules)
    }

    /// POST a form to a data endpoint and unwrap the vendor envelope.
    async fn post_data<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("access token rejected (HTTP {status})"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::VendorApi {
                message: body,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if !envelope.is_ok() {
            return Err(Error::VendorApi {
                message: envelope
                    .status
                    .unwrap_or_else(|| "missing status".into()),
                status: status.as_u16(),
            });
        }

        Ok(envelope.body)
    }
}
