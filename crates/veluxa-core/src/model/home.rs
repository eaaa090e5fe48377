use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use veluxa_api::RawHome;

use super::id::HomeId;

/// A vendor-defined site grouping of devices.
///
/// Identity is the vendor-assigned id alone: two `Home` values with the
/// same id are the same home regardless of display name or attributes,
/// so a renamed home correlates to its previous entities across cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Home {
    pub id: HomeId,
    pub name: String,
    /// Unmodelled vendor fields (place, notification settings, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl PartialEq for Home {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Home {}

impl std::hash::Hash for Home {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<RawHome> for Home {
    fn from(raw: RawHome) -> Self {
        Self {
            id: HomeId::from(raw.id),
            name: raw.name,
            attributes: raw.extra,
        }
    }
}
