// Vendor-assigned identifier newtypes.
//
// Both homes and modules are keyed by opaque strings the cloud hands
// out (hex object ids for homes, MAC-like ids for modules). Newtypes
// keep the two from being mixed up at call sites.

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

id_newtype! {
    /// Identifier of a vendor-defined home (site grouping of devices).
    HomeId
}

id_newtype! {
    /// Identifier of a single module (gateway, switch, window, shutter).
    DeviceId
}
