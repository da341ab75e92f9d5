// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::sdk::{FheInstance, InstanceConfig, RelayerSdk};
use actix::Addr;
use cv_events::{EventBus, FheStatus, VoteError, VotingEvent};
use cv_evm::Wallet;
use std::sync::{Arc, RwLock};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Owns the process-wide encryption instance. Initialization is guarded by
/// a `OnceCell`, so concurrent callers serialize on one bootstrap and a
/// failed attempt leaves the cell empty for a retry.
pub struct InstanceManager {
    sdk: Arc<dyn RelayerSdk>,
    config: InstanceConfig,
    wallet: Wallet,
    bus: Option<Addr<EventBus<VotingEvent>>>,
    cell: OnceCell<Arc<dyn FheInstance>>,
    status: RwLock<FheStatus>,
    last_error: RwLock<Option<String>>,
}

impl InstanceManager {
    pub fn new(sdk: Arc<dyn RelayerSdk>, config: InstanceConfig, wallet: Wallet) -> Self {
        Self {
            sdk,
            config,
            wallet,
            bus: None,
            cell: OnceCell::new(),
            status: RwLock::new(FheStatus::Idle),
            last_error: RwLock::new(None),
        }
    }

    /// Broadcast status transitions on the given bus.
    pub fn with_bus(mut self, bus: Addr<EventBus<VotingEvent>>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Idempotent. The first successful call bootstraps the SDK and
    /// creates the network-bound instance; later calls return it
    /// immediately. Requires a detected wallet provider.
    pub async fn initialize(&self) -> Result<Arc<dyn FheInstance>, VoteError> {
        if let Some(instance) = self.cell.get() {
            return Ok(instance.clone());
        }

        let result = self
            .cell
            .get_or_try_init(|| async {
                self.set_status(FheStatus::Loading);

                if !self.wallet.is_connected() {
                    return Err(VoteError::Environment(
                        "no wallet provider detected; connect a wallet first".to_string(),
                    ));
                }

                self.sdk.init_sdk().await?;
                let instance = self.sdk.create_instance(self.config.clone()).await?;
                info!(chain_id = self.config.chain_id, "FHE instance created");
                Ok(instance)
            })
            .await;

        match result {
            Ok(instance) => {
                self.set_status(FheStatus::Ready);
                Ok(instance.clone())
            }
            Err(err) => {
                *self.last_error.write().expect("status lock poisoned") =
                    Some(err.to_string());
                self.set_status(FheStatus::Error);
                Err(err)
            }
        }
    }

    /// The instance, if ready. Never blocks, never errors.
    pub fn get(&self) -> Option<Arc<dyn FheInstance>> {
        self.cell.get().cloned()
    }

    pub fn status(&self) -> FheStatus {
        *self.status.read().expect("status lock poisoned")
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().expect("status lock poisoned").clone()
    }

    fn set_status(&self, status: FheStatus) {
        let changed = {
            let mut guard = self.status.write().expect("status lock poisoned");
            let changed = *guard != status;
            *guard = status;
            changed
        };
        if changed {
            if let Some(bus) = &self.bus {
                bus.do_send(VotingEvent::FheStatusChanged { status });
            }
        }
    }
}

/// Trigger initialization the first time the wallet reports connected, and
/// again after reconnects while no instance exists. Failures are logged
/// and surfaced as bus events; the user retriggers by reconnecting.
pub fn spawn_auto_initialize(manager: Arc<InstanceManager>) -> tokio::task::JoinHandle<()> {
    let mut rx = manager.wallet().subscribe();
    tokio::spawn(async move {
        loop {
            let connected = rx.borrow_and_update().is_connected();
            if connected && manager.get().is_none() {
                if let Err(err) = manager.initialize().await {
                    warn!("FHE auto-initialization failed: {err}");
                }
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
