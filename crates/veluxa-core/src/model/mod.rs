// ── Domain model ──

mod device;
mod home;
mod id;

pub use device::{Device, DeviceKind, Gateway, Shutter, Switch, Window};
pub use home::Home;
pub use id::{DeviceId, HomeId};
