// ── Raw record -> typed device mapping ──
//
// The vendor reports heterogeneous module records discriminated by
// `type`, with `velux_type` sub-discriminating NXO actuators:
//
//   type == "NXG"                          -> Gateway
//   type == "NXS"                          -> Switch
//   type == "NXO", velux_type == "shutter" -> Shutter
//   type == "NXO", velux_type == "window"  -> Window
//   anything else                          -> dropped
//
// Unknown combinations are not errors: the record is skipped with a
// debug log and the cycle carries on.

use tracing::debug;

use veluxa_api::RawModule;

use crate::model::{Device, Gateway, HomeId, Shutter, Switch, Window};

/// Map one raw module record into a typed device owned by `home`.
///
/// Returns `None` both for unknown discriminators and for records whose
/// payload does not deserialize into the selected variant.
pub fn map_module(home: &HomeId, raw: &RawModule) -> Option<Device> {
    let value = raw.to_value();

    let mapped = match (raw.module_type.as_str(), raw.velux_type.as_deref()) {
        ("NXG", _) => serde_json::from_value::<Gateway>(value).map(Device::Gateway),
        ("NXS", _) => serde_json::from_value::<Switch>(value).map(Device::Switch),
        ("NXO", Some("shutter")) => serde_json::from_value::<Shutter>(value).map(Device::Shutter),
        ("NXO", Some("window")) => serde_json::from_value::<Window>(value).map(Device::Window),
        (module_type, velux_type) => {
            debug!(id = %raw.id, module_type, ?velux_type, "unknown module kind; skipping");
            return None;
        }
    };

    let mut device = match mapped {
        Ok(device) => device,
        Err(e) => {
            debug!(id = %raw.id, module_type = %raw.module_type, error = %e,
                   "malformed module record; skipping");
            return None;
        }
    };

    match &mut device {
        Device::Gateway(d) => d.home = home.clone(),
        Device::Window(d) => d.home = home.clone(),
        Device::Shutter(d) => d.home = home.clone(),
        Device::Switch(d) => d.home = home.clone(),
    }
    Some(device)
}
