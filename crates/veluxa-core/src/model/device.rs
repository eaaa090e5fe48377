// ── Device domain types ──
//
// One struct per discriminated module kind, deserialized from the raw
// `homestatus` record. Fields the vendor omits for older firmware are
// Options; anything not modelled lands in the `extra` side-map. The
// owning home is attached after deserialization (it is not part of the
// wire record).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{DeviceId, HomeId};

/// Discriminated device kind (the mapped `(type, velux_type)` pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Gateway,
    Window,
    Shutter,
    Switch,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gateway => "gateway",
            Self::Window => "window",
            Self::Shutter => "shutter",
            Self::Switch => "switch",
        };
        f.write_str(s)
    }
}

/// The NXG bridge unit: lock/alarm state plus connectivity and weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub id: DeviceId,
    /// Owning home; attached by the mapper, not present on the wire.
    #[serde(skip)]
    pub home: HomeId,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub busy: Option<bool>,
    #[serde(default)]
    pub calibrating: Option<bool>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub locking: Option<bool>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub is_raining: Option<bool>,
    #[serde(default)]
    pub wifi_strength: Option<i64>,
    #[serde(default)]
    pub wifi_state: Option<String>,
    #[serde(default)]
    pub firmware_revision_netatmo: Option<i64>,
    #[serde(default)]
    pub firmware_revision_thirdparty: Option<String>,
    #[serde(default)]
    pub hardware_version: Option<i64>,
    #[serde(default)]
    pub pairing: Option<String>,
    #[serde(default)]
    pub last_seen: Option<i64>,
    #[serde(default)]
    pub outdated_weather_forecast: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Gateway {
    /// Inverse of `locked`, for "unlocked" binary presentation.
    pub fn unlocked(&self) -> Option<bool> {
        self.locked.map(|locked| !locked)
    }
}

/// A roof window (NXO / velux_type "window").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub id: DeviceId,
    #[serde(skip)]
    pub home: HomeId,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default)]
    pub velux_type: Option<String>,
    #[serde(default)]
    pub current_position: Option<i64>,
    #[serde(default)]
    pub target_position: Option<i64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub reachable: Option<bool>,
    #[serde(default)]
    pub silent: Option<bool>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub bridge: Option<String>,
    #[serde(default)]
    pub firmware_revision: Option<i64>,
    #[serde(default)]
    pub last_seen: Option<i64>,
    /// Position the window moves to when rain is detected.
    #[serde(default)]
    pub rain_position: Option<i64>,
    /// Position enforced while the home is secured.
    #[serde(default)]
    pub secure_position: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A roller shutter or blind (NXO / velux_type "shutter").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shutter {
    pub id: DeviceId,
    #[serde(skip)]
    pub home: HomeId,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default)]
    pub velux_type: Option<String>,
    #[serde(default)]
    pub current_position: Option<i64>,
    #[serde(default)]
    pub target_position: Option<i64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub reachable: Option<bool>,
    #[serde(default)]
    pub silent: Option<bool>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub bridge: Option<String>,
    #[serde(default)]
    pub firmware_revision: Option<i64>,
    #[serde(default)]
    pub last_seen: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The NXS wall switch / remote: battery and RF health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub id: DeviceId,
    #[serde(skip)]
    pub home: HomeId,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default)]
    pub battery_level: Option<i64>,
    #[serde(default)]
    pub battery_percent: Option<i64>,
    #[serde(default)]
    pub battery_state: Option<String>,
    #[serde(default)]
    pub rf_strength: Option<i64>,
    #[serde(default)]
    pub rf_state: Option<String>,
    #[serde(default)]
    pub reachable: Option<bool>,
    #[serde(default)]
    pub bridge: Option<String>,
    #[serde(default)]
    pub firmware_revision: Option<i64>,
    #[serde(default)]
    pub last_seen: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A typed device record, tagged by discriminated kind.
///
/// Rebuilt wholesale every polling cycle; a device disappears by not
/// being present in the next cycle's mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Device {
    Gateway(Gateway),
    Window(Window),
    Shutter(Shutter),
    Switch(Switch),
}

impl Device {
    /// The vendor-assigned module identifier, stable across cycles.
    pub fn id(&self) -> &DeviceId {
        match self {
            Self::Gateway(d) => &d.id,
            Self::Window(d) => &d.id,
            Self::Shutter(d) => &d.id,
            Self::Switch(d) => &d.id,
        }
    }

    /// The owning home (non-owning back-reference by id).
    pub fn home(&self) -> &HomeId {
        match self {
            Self::Gateway(d) => &d.home,
            Self::Window(d) => &d.home,
            Self::Shutter(d) => &d.home,
            Self::Switch(d) => &d.home,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Gateway(_) => DeviceKind::Gateway,
            Self::Window(_) => DeviceKind::Window,
            Self::Shutter(_) => DeviceKind::Shutter,
            Self::Switch(_) => DeviceKind::Switch,
        }
    }

    /// Vendor-reported display name, where the record carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Gateway(d) => d.name.as_deref(),
            _ => None,
        }
    }

    /// Whether the module answered its bridge on the last report.
    /// Gateways report through wifi state instead.
    pub fn reachable(&self) -> Option<bool> {
        match self {
            Self::Gateway(_) => None,
            Self::Window(d) => d.reachable,
            Self::Shutter(d) => d.reachable,
            Self::Switch(d) => d.reachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gateway_unlocked_inverts_locked() {
        let mut gw: Gateway = serde_json::from_value(json!({
            "id": "gw1", "type": "NXG", "locked": true,
        }))
        .expect("valid gateway json");
        assert_eq!(gw.unlocked(), Some(false));

        gw.locked = Some(false);
        assert_eq!(gw.unlocked(), Some(true));

        gw.locked = None;
        assert_eq!(gw.unlocked(), None);
    }

    #[test]
    fn devices_with_same_id_but_different_kind_are_distinct() {
        let window: Window = serde_json::from_value(json!({
            "id": "m1", "type": "NXO", "velux_type": "window",
        }))
        .expect("valid window json");
        let shutter: Shutter = serde_json::from_value(json!({
            "id": "m1", "type": "NXO", "velux_type": "shutter",
        }))
        .expect("valid shutter json");

        let a = Device::Window(window);
        let b = Device::Shutter(shutter);
        assert_eq!(a.id(), b.id());
        assert_ne!(a, b);
        assert_ne!(a.kind(), b.kind());
    }

    #[test]
    fn unknown_fields_collect_into_extra() {
        let sw: Switch = serde_json::from_value(json!({
            "id": "sw1", "type": "NXS", "battery_percent": 77,
            "some_future_field": {"nested": true},
        }))
        .expect("valid switch json");

        assert_eq!(sw.battery_percent, Some(77));
        assert_eq!(sw.extra["some_future_field"]["nested"], true);
    }
}
