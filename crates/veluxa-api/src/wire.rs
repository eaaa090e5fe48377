// Wire-format types for the Velux Active cloud API.
//
// Data endpoints wrap their payload in a `{ body: ..., status: "ok" }`
// envelope. Raw records keep every field the typed layer does not name
// in a flattened side-map, so nothing the vendor sends is lost before
// `veluxa-core` maps records into domain types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response from the `/oauth2/token` endpoint (both grant types).
///
/// The vendor also sends `expire_in` (sic) and `scope`; neither is used.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_in: i64,
}

/// Generic vendor response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub body: T,
    #[serde(default)]
    pub status: Option<String>,
}

impl<T> Envelope<T> {
    /// Whether the vendor marked the response as successful.
    /// A missing `status` field is treated as success.
    pub fn is_ok(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "ok")
    }
}

/// Payload of `/api/gethomedata`.
#[derive(Debug, Deserialize)]
pub struct HomesBody {
    #[serde(default)]
    pub homes: Vec<RawHome>,
}

/// Payload of `/api/homestatus`.
#[derive(Debug, Deserialize)]
pub struct HomeStatusBody {
    pub home: HomeStatus,
}

#[derive(Debug, Deserialize)]
pub struct HomeStatus {
    pub id: String,
    #[serde(default)]
    pub modules: Vec<RawModule>,
}

/// A home record as reported by `gethomedata`.
///
/// Only `id` and `name` are modelled; the rest (place, notification
/// settings, persons, ...) lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHome {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A module record as reported by `homestatus`, before discrimination.
///
/// `type` is the coarse discriminator ("NXG"/"NXS"/"NXO"); `velux_type`
/// is the NXO sub-discriminator ("window"/"shutter"). All remaining
/// fields ride along in `extra` for the typed mapper to pick apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawModule {
    pub id: String,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velux_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawModule {
    /// Reassemble the record as a single JSON object, discriminators
    /// included, for deserialization into a typed device struct.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
