//! Async client for the Velux Active cloud API.
//!
//! The vendor exposes three form-encoded POST endpoints: an OAuth2 token
//! endpoint (password and refresh_token grants) and two data endpoints,
//! `gethomedata` (list homes) and `homestatus` (per-home module list).
//! This crate wraps them behind [`VeluxClient`] and keeps the bearer token
//! fresh automatically. `veluxa-core` builds the domain model on top.

pub mod client;
pub mod error;
pub mod token;
pub mod transport;
pub mod wire;

pub use client::{VeluxClient, DEFAULT_API_URL};
pub use error::Error;
pub use token::{AuthToken, REFRESH_MARGIN_SECS};
pub use transport::TransportConfig;
pub use wire::{RawHome, RawModule, TokenResponse};
