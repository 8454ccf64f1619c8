//! Live subscription manager for the new-wave push feed.
//!
//! Bridges the ledger's push subscription into the wave store: one background
//! task consumes the event stream and appends each arrival, in order, with no
//! batching or reordering. The manager guards against double subscription and
//! releases the feed on `stop` or drop.

use crate::context::PortalContext;
use crate::ledger::LedgerError;
use crate::waves::store::{SharedWaveStore, WaveEntry};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub struct LiveSubscriptionManager {
    context: Arc<PortalContext>,
    store: SharedWaveStore,
    /// Live consumer task; `Some` means a subscription is active.
    task: Option<JoinHandle<()>>,
}

impl LiveSubscriptionManager {
    pub fn new(context: Arc<PortalContext>, store: SharedWaveStore) -> Self {
        Self {
            context,
            store,
            task: None,
        }
    }

    /// Open the push subscription and start feeding the store.
    ///
    /// Idempotent: calling `start` while already started never opens a second
    /// subscription. Without a wallet provider this does nothing at all; a
    /// missing provider is a normal environment state on this path.
    pub async fn start(&mut self) -> Result<(), LedgerError> {
        if self.task.is_some() {
            debug!("Wave subscription already active, ignoring start");
            return Ok(());
        }

        if !self.context.has_provider() {
            debug!("No wallet provider detected, skipping wave subscription");
            return Ok(());
        }

        let mut stream = self.context.ledger.subscribe_new_waves().await?;
        let store = self.store.clone();

        let task = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(record) => {
                        let entry = WaveEntry::from(record);
                        let appended = store.lock().unwrap().append(entry.clone());
                        if appended {
                            info!(
                                "NewWave from {} at {}: {}",
                                entry.sender, entry.timestamp, entry.message
                            );
                        } else {
                            debug!("Duplicate wave from {} suppressed", entry.sender);
                        }
                    }
                    Err(e) => {
                        // Keep consuming; a broken event is not a broken feed.
                        error!("Error in wave subscription: {}", e);
                    }
                }
            }
            debug!("Wave event stream ended");
        });

        self.task = Some(task);
        info!("Wave subscription started");
        Ok(())
    }

    /// Close the subscription. Safe to call when not started.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Wave subscription stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for LiveSubscriptionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
