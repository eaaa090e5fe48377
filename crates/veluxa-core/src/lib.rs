// veluxa-core: Domain layer between veluxa-api and consumers.
//
// Maps raw vendor records into typed homes and devices, rebuilds a
// complete snapshot every polling cycle, and publishes it atomically
// through the StateStore. The Hub owns the whole lifecycle.

pub mod config;
pub mod convert;
pub mod error;
pub mod hub;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::HubConfig;
pub use convert::map_module;
pub use error::CoreError;
pub use hub::{ConnectionState, Hub};
pub use store::{StateSnapshot, StateStore};

// Re-export model types at the crate root for ergonomics.
pub use model::{Device, DeviceId, DeviceKind, Gateway, Home, HomeId, Shutter, Switch, Window};
