// ── Published state store ──
//
// Every polling cycle builds one complete StateSnapshot and publishes
// it atomically. Readers get wait-free access to the latest snapshot
// through ArcSwap; push-style consumers subscribe to a watch channel.
// A failed cycle publishes nothing, so the previous snapshot stays
// visible until the next successful cycle.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Device, DeviceId, Home, HomeId};

/// One complete fetch-map pass: every home and its mapped devices.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    pub homes: Vec<Home>,
    pub devices: HashMap<HomeId, Vec<Device>>,
}

impl StateSnapshot {
    /// Devices belonging to one home, empty when the home is unknown.
    pub fn devices_for(&self, home: &HomeId) -> &[Device] {
        self.devices.get(home).map_or(&[], Vec::as_slice)
    }

    /// Find a device anywhere in the snapshot by its stable identifier.
    pub fn device_by_id(&self, id: &DeviceId) -> Option<&Device> {
        self.devices
            .values()
            .flat_map(|devices| devices.iter())
            .find(|device| device.id() == id)
    }

    pub fn home_count(&self) -> usize {
        self.homes.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.values().map(Vec::len).sum()
    }
}

/// Atomically replaced holder of the latest [`StateSnapshot`].
pub struct StateStore {
    current: ArcSwap<StateSnapshot>,
    snapshot_tx: watch::Sender<Arc<StateSnapshot>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl StateStore {
    pub fn new() -> Self {
        let empty = Arc::new(StateSnapshot::default());
        let (snapshot_tx, _) = watch::channel(Arc::clone(&empty));
        let (last_refresh, _) = watch::channel(None);

        Self {
            current: ArcSwap::new(empty),
            snapshot_tx,
            last_refresh,
        }
    }

    /// Replace the published snapshot and notify subscribers.
    pub(crate) fn publish(&self, snapshot: StateSnapshot) {
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot_tx.send_modify(|s| *s = snapshot);
        self.last_refresh.send_modify(|t| *t = Some(Utc::now()));
    }

    /// The latest snapshot (cheap `Arc` clone, wait-free).
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.current.load_full()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StateSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// When the last successful cycle published, or `None` if never.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How stale the published snapshot is, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::TimeDelta> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
