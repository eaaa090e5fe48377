// ── Hub: connection lifecycle and polling coordinator ──
//
// Owns the API client, the published state, and the background refresh
// task. One cooperative task performs each cycle: fetch the home list,
// then sequentially fetch each home's module statuses, map records,
// and publish a single new snapshot. Fetches are not pipelined; the
// first error aborts the cycle before anything is published.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use veluxa_api::{TransportConfig, VeluxClient};

use crate::config::HubConfig;
use crate::convert::map_module;
use crate::error::CoreError;
use crate::model::{Device, Home};
use crate::store::{StateSnapshot, StateStore};

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

// ── Hub ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<HubInner>`. `connect()` authenticates,
/// performs one synchronous refresh, and starts the periodic refresh
/// task; the host reads state through [`snapshot()`](Self::snapshot)
/// or a [`subscribe()`](Self::subscribe) watch channel.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    config: HubConfig,
    client: VeluxClient,
    store: Arc<StateStore>,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    refresh_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Hub {
    /// Create a new Hub from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and start polling.
    pub fn new(config: HubConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client =
            VeluxClient::new(config.api_url.clone(), &transport).map_err(|e| CoreError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(HubInner {
                config,
                client,
                store: Arc::new(StateStore::new()),
                connection_state,
                cancel: CancellationToken::new(),
                refresh_handle: Mutex::new(None),
            }),
        })
    }

    /// Access the hub configuration.
    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    /// Access the underlying state store.
    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the cloud.
    ///
    /// Authenticates, performs the initial refresh synchronously (its
    /// failure fails the connect), then spawns the periodic refresh
    /// task when `refresh_interval_secs > 0`.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        let config = &self.inner.config;

        if let Err(e) = self
            .inner
            .client
            .authenticate(&config.username, &config.password)
            .await
        {
            let _ = self
                .inner
                .connection_state
                .send(ConnectionState::Disconnected);
            return Err(CoreError::from(e));
        }
        debug!("authentication successful");

        // Initial data load; the host gets a populated snapshot before
        // connect() returns.
        if let Err(e) = self.refresh().await {
            let _ = self
                .inner
                .connection_state
                .send(ConnectionState::Disconnected);
            return Err(e);
        }

        let interval_secs = config.refresh_interval_secs;
        if interval_secs > 0 {
            let hub = self.clone();
            let cancel = self.inner.cancel.clone();
            let handle = tokio::spawn(refresh_task(hub, interval_secs, cancel));
            *self.inner.refresh_handle.lock().await = Some(handle);
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!("connected to Velux Active cloud");
        Ok(())
    }

    /// Disconnect: stop the refresh task and reset the state.
    ///
    /// The last published snapshot stays readable; there is no session
    /// to tear down on the vendor side.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        if let Some(handle) = self.inner.refresh_handle.lock().await.take() {
            let _ = handle.await;
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Refresh cycle ────────────────────────────────────────────

    /// Run one refresh cycle now.
    ///
    /// Every failure is scoped to this cycle: the previous snapshot
    /// remains published and the error is the transient
    /// [`CoreError::UpdateFailed`]. A hard auth failure additionally
    /// re-authenticates with the stored credentials so the next cycle
    /// starts from a fresh session.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        if *self.inner.connection_state.borrow() == ConnectionState::Disconnected {
            return Err(CoreError::Disconnected);
        }

        match self.run_cycle().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_auth_error() => {
                warn!(error = %e, "auth failure during refresh; re-authenticating");
                let config = &self.inner.config;
                if let Err(auth_err) = self
                    .inner
                    .client
                    .authenticate(&config.username, &config.password)
                    .await
                {
                    warn!(error = %auth_err, "re-authentication failed");
                }
                Err(CoreError::UpdateFailed {
                    message: format!("re-authenticated after auth failure: {e}"),
                })
            }
            Err(e) => Err(CoreError::UpdateFailed {
                message: format!("error communicating with the cloud: {e}"),
            }),
        }
    }

    /// Fetch, map, publish. Sequential by design: the home list first,
    /// then one status fetch per home in order. Nothing is published
    /// unless the whole pass succeeds.
    async fn run_cycle(&self) -> Result<(), veluxa_api::Error> {
        let client = &self.inner.client;

        let raw_homes = client.get_homes().await?;

        let mut homes = Vec::with_capacity(raw_homes.len());
        let mut devices = HashMap::with_capacity(raw_homes.len());

        for raw_home in raw_homes {
            let home = Home::from(raw_home);
            let modules = client.get_home_status(home.id.as_str()).await?;
            let mapped: Vec<Device> = modules
                .iter()
                .filter_map(|module| map_module(&home.id, module))
                .collect();
            devices.insert(home.id.clone(), mapped);
            homes.push(home);
        }

        let snapshot = StateSnapshot { homes, devices };
        debug!(
            homes = snapshot.home_count(),
            devices = snapshot.device_count(),
            "refresh cycle complete"
        );
        self.inner.store.publish(snapshot);
        Ok(())
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.inner.store.snapshot()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StateSnapshot>> {
        self.inner.store.subscribe()
    }
}

// ── Background task ──────────────────────────────────────────────

/// Periodically refresh on a fixed cadence until cancelled.
/// A failed cycle is logged and retried on the next tick.
async fn refresh_task(hub: Hub, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = hub.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
