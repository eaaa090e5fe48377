// ── Core error types ──
//
// User-facing errors from veluxa-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<veluxa_api::Error>`
// impl translates transport-layer errors into domain variants. Every
// polling failure is scoped to one cycle -- there is no fatal path.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credentials rejected, either at connect or on re-authentication.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// One refresh cycle failed; the previous snapshot remains
    /// published and the next tick retries.
    #[error("Update cycle failed: {message}")]
    UpdateFailed { message: String },

    /// Operation requires a connected hub.
    #[error("Hub is not connected")]
    Disconnected,

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether retrying on the next polling tick can resolve this.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. })
    }
}

impl From<veluxa_api::Error> for CoreError {
    fn from(err: veluxa_api::Error) -> Self {
        match err {
            veluxa_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            veluxa_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "not authenticated".into(),
            },
            veluxa_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            other => CoreError::UpdateFailed {
                message: other.to_string(),
            },
        }
    }
}
