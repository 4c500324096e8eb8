pub mod cache;
pub mod contract;
pub mod export;
pub mod gateway;
pub mod provider;
pub mod tracker;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::data::cache::ContractCache;
use crate::data::gateway::ContractGateway;
use crate::data::types::{ContractCall, Contracts, Room};
use crate::events::AppEvent;
use crate::tx::{ControllerId, TxUpdate};

/// Runs gateway reads and writes on background tasks and reports results as
/// `AppEvent`s. Reads go through the shared cache.
pub struct DataService {
    gateway: Arc<dyn ContractGateway>,
    cache: Arc<RwLock<ContractCache>>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl DataService {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        poll_interval: Duration,
        receipt_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            cache: Arc::new(RwLock::new(ContractCache::new())),
            event_tx,
            poll_interval,
            receipt_timeout,
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.gateway.account()
    }

    pub fn contracts(&self) -> Contracts {
        self.gateway.contracts()
    }

    /// Fetch all rooms, from cache when fresh.
    pub fn fetch_rooms(&self) {
        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            load_rooms(gateway.as_ref(), &cache, &tx).await;
        });
    }

    /// Fetch the contract owner, from cache when fresh.
    pub fn fetch_owner(&self) {
        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            load_owner(gateway.as_ref(), &cache, &tx).await;
        });
    }

    /// Fetch the connected account's allowance for the booking contract.
    pub fn fetch_allowance(&self) {
        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            load_allowance(gateway.as_ref(), &cache, &tx).await;
        });
    }

    /// Invalidate every cached read, then re-read rooms, owner and allowance.
    pub fn refresh(&self) {
        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            cache.write().await.invalidate();
            let gateway = gateway.as_ref();
            tokio::join!(
                load_rooms(gateway, &cache, &tx),
                load_owner(gateway, &cache, &tx),
                load_allowance(gateway, &cache, &tx),
            );
        });
    }

    /// Submit a signed write and track it to a receipt, reporting each step
    /// to `controller`.
    pub fn submit(&self, controller: ControllerId, call: ContractCall) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.event_tx.clone();
        let poll_interval = self.poll_interval;
        let receipt_timeout = self.receipt_timeout;

        tokio::spawn(async move {
            let function = call.function_name();
            let hash = match gateway.submit(&call).await {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(function, error = %e, "submission failed");
                    let _ = tx.send(AppEvent::Tx {
                        controller,
                        update: TxUpdate::SubmitFailed(e),
                    });
                    return;
                }
            };
            info!(function, %hash, "transaction submitted");
            let _ = tx.send(AppEvent::Tx {
                controller,
                update: TxUpdate::Accepted(hash),
            });

            let update = match tracker::wait_for_receipt(
                gateway.as_ref(),
                hash,
                poll_interval,
                receipt_timeout,
            )
            .await
            {
                Ok(()) => {
                    info!(function, %hash, "transaction confirmed");
                    TxUpdate::Confirmed(hash)
                }
                Err(e) => {
                    warn!(function, %hash, error = %e, "transaction failed");
                    TxUpdate::Failed { hash, error: e }
                }
            };
            let _ = tx.send(AppEvent::Tx { controller, update });
        });
    }

    /// Write the room list to a timestamped CSV in `dir`.
    pub fn export_rooms(&self, rooms: Vec<Room>, dir: PathBuf) {
        let tx = self.event_tx.clone();

        tokio::task::spawn_blocking(move || {
            let name = format!(
                "hotel-rooms-{}.csv",
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            );
            let event = match export::export_rooms_csv(&rooms, &dir.join(name)) {
                Ok(msg) => AppEvent::ExportComplete(msg),
                Err(e) => AppEvent::Error(e),
            };
            let _ = tx.send(event);
        });
    }
}

async fn load_rooms(
    gateway: &dyn ContractGateway,
    cache: &RwLock<ContractCache>,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let generation = {
        let cache = cache.read().await;
        if let Some(rooms) = cache.get_rooms() {
            debug!(count = rooms.len(), "rooms served from cache");
            let _ = tx.send(AppEvent::RoomsLoaded(rooms));
            return;
        }
        cache.generation()
    };

    let result = gateway.get_all_rooms().await;
    let mut cache = cache.write().await;
    if cache.is_stale(generation) {
        debug!("discarding rooms read started before invalidation");
        return;
    }
    match result {
        Ok(rooms) => {
            cache.put_rooms(rooms.clone());
            let _ = tx.send(AppEvent::RoomsLoaded(rooms));
        }
        Err(e) => {
            warn!(error = %e, "failed to load rooms");
            let _ = tx.send(AppEvent::ReadFailed(format!("Failed to load rooms: {e}")));
        }
    }
}

async fn load_owner(
    gateway: &dyn ContractGateway,
    cache: &RwLock<ContractCache>,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let generation = {
        let cache = cache.read().await;
        if let Some(owner) = cache.get_owner() {
            let _ = tx.send(AppEvent::OwnerLoaded(owner));
            return;
        }
        cache.generation()
    };

    let result = gateway.owner().await;
    let mut cache = cache.write().await;
    if cache.is_stale(generation) {
        debug!("discarding owner read started before invalidation");
        return;
    }
    match result {
        Ok(owner) => {
            cache.put_owner(owner);
            let _ = tx.send(AppEvent::OwnerLoaded(owner));
        }
        Err(e) => {
            warn!(error = %e, "failed to load owner");
            let _ = tx.send(AppEvent::ReadFailed(format!("Failed to load owner: {e}")));
        }
    }
}

async fn load_allowance(
    gateway: &dyn ContractGateway,
    cache: &RwLock<ContractCache>,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    // Read-only sessions have no allowance to show
    let Some(owner) = gateway.account() else {
        return;
    };
    let spender = gateway.contracts().booking;

    let generation = {
        let mut cache = cache.write().await;
        if let Some(amount) = cache.get_allowance(owner, spender) {
            let _ = tx.send(AppEvent::AllowanceLoaded {
                owner,
                spender,
                amount,
            });
            return;
        }
        cache.generation()
    };

    let result = gateway.allowance(owner, spender).await;
    let mut cache = cache.write().await;
    if cache.is_stale(generation) {
        debug!("discarding allowance read started before invalidation");
        return;
    }
    match result {
        Ok(amount) => {
            cache.put_allowance(owner, spender, amount);
            let _ = tx.send(AppEvent::AllowanceLoaded {
                owner,
                spender,
                amount,
            });
        }
        Err(e) => {
            warn!(error = %e, "failed to load allowance");
            let _ = tx.send(AppEvent::AllowanceFailed(format!(
                "Failed to load allowance: {e}"
            )));
        }
    }
}
