//! Session-wide dependency context.
//!
//! Everything the original environment kept as ambient globals (the injected
//! wallet provider, the contract handle) is owned here and passed explicitly
//! to each component at construction. One instance exists per process session.

use crate::ledger::LedgerClient;
use crate::wallet::WalletProvider;
use std::sync::Arc;

/// Owned, single-instance bundle of the external collaborators.
pub struct PortalContext {
	/// Client for the remote wave-portal contract.
	pub ledger: Arc<dyn LedgerClient>,
	/// The user's wallet provider, if one is present in this environment.
	pub provider: Option<Arc<dyn WalletProvider>>,
}

impl PortalContext {
	pub fn new(
		ledger: Arc<dyn LedgerClient>,
		provider: Option<Arc<dyn WalletProvider>>,
	) -> Arc<Self> {
		Arc::new(Self { ledger, provider })
	}

	/// Whether a wallet provider is present in this environment.
	pub fn has_provider(&self) -> bool {
		self.provider.is_some()
	}
}
