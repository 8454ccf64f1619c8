mod context;
mod ledger;
mod wallet;
mod waves;

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::context::PortalContext;
use crate::ledger::PortalLedgerClient;
use crate::wallet::{StaticWalletProvider, WalletProvider, WalletSession};
use crate::waves::{
	LiveSubscriptionManager, SubmitConfig, WaveEntry, WaveStore, WaveSubmissionController,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	// Initialize tracing subscriber with debug logging for this crate
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive("waveportal_sync=debug".parse().unwrap())
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting wave portal sync service");

	let ledger = Arc::new(PortalLedgerClient::new(
		"https://indexer.waveportal.network/api/v1/graphql".to_string(),
		"wss://indexer.waveportal.network/api/v1/graphql/ws".to_string(),
	));

	info!("Created ledger client");

	// A wallet provider may legitimately be absent; the read-only paths below
	// still work without one.
	let provider: Option<Arc<dyn WalletProvider>> = match std::env::var("PORTAL_ACCOUNT") {
		Ok(account) => Some(Arc::new(StaticWalletProvider::new(account))),
		Err(_) => None,
	};

	let context = PortalContext::new(ledger, provider);
	let session = Arc::new(WalletSession::new(context.clone()));

	if session.check_existing_authorization().await.is_none() {
		match session.request_authorization().await {
			Ok(account) => info!("Connected: {}", account),
			Err(e) => error!("Wallet authorization failed: {}", e),
		}
	}

	let store = WaveStore::shared();

	match context.ledger.get_all_waves().await {
		Ok(records) => {
			let entries: Vec<WaveEntry> = records.into_iter().map(WaveEntry::from).collect();
			info!("Fetched {} waves from the ledger", entries.len());
			store.lock().unwrap().replace_all(entries);
		}
		Err(e) => error!("Failed to fetch waves: {}", e),
	}

	let mut subscription = LiveSubscriptionManager::new(context.clone(), store.clone());
	if let Err(e) = subscription.start().await {
		error!("Failed to start wave subscription: {}", e);
	}

	let controller = WaveSubmissionController::new(
		context.clone(),
		session.clone(),
		store.clone(),
		SubmitConfig::default(),
	);

	let message = std::env::args()
		.nth(1)
		.unwrap_or_else(|| "hello from waveportal-sync".to_string());

	match controller.submit(&message).await {
		Ok(count) => info!("Wave recorded, total waves now {}", count),
		Err(e) => error!("Failed to submit wave: {}", e),
	}

	// Leave the push feed open long enough for the submitted wave to come back
	// through it before tearing the session down.
	tokio::time::sleep(Duration::from_secs(30)).await;

	subscription.stop();
	session.disconnect();

	let store = store.lock().unwrap();
	info!("All waves ({})", store.len());
	for wave in store.all() {
		info!("{} at {}: {}", wave.sender, wave.timestamp, wave.message);
	}
}
