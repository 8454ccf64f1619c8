use crate::context::PortalContext;
use crate::wallet::provider::WalletError;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Tracks the currently authorized account identity for this process session.
///
/// The identity is set at most once per successful authorization and is
/// authoritative until `disconnect` is called. The session never downgrades
/// itself to disconnected on its own.
pub struct WalletSession {
	context: Arc<PortalContext>,
	account: Mutex<Option<String>>,
}

impl WalletSession {
	pub fn new(context: Arc<PortalContext>) -> Self {
		Self {
			context,
			account: Mutex::new(None),
		}
	}

	/// Query the provider for an already-granted account, without prompting.
	///
	/// Provider absence and provider errors are logged and swallowed; both are
	/// normal environment states on this path.
	pub async fn check_existing_authorization(&self) -> Option<String> {
		let provider = match &self.context.provider {
			Some(provider) => provider,
			None => {
				debug!("No wallet provider detected, skipping account check");
				return None;
			}
		};

		match provider.authorized_accounts().await {
			Ok(accounts) => match accounts.into_iter().next() {
				Some(account) => {
					info!("Found an authorized account: {}", account);
					*self.account.lock().unwrap() = Some(account.clone());
					Some(account)
				}
				None => {
					info!("No authorized account found");
					None
				}
			},
			Err(e) => {
				warn!("Account check failed: {}", e);
				None
			}
		}
	}

	/// Actively prompt the user for authorization via the provider.
	///
	/// Fails with `ProviderUnavailable` when no provider is present and with
	/// `UserRejected` when the prompt is declined. No retry is attempted.
	pub async fn request_authorization(&self) -> Result<String, WalletError> {
		let provider = self
			.context
			.provider
			.as_ref()
			.ok_or(WalletError::ProviderUnavailable)?;

		let accounts = provider.request_accounts().await?;
		let account = accounts.into_iter().next().ok_or(WalletError::UserRejected)?;

		info!("Connected account: {}", account);
		*self.account.lock().unwrap() = Some(account.clone());
		Ok(account)
	}

	/// The authorized account identity, if any.
	pub fn current_account(&self) -> Option<String> {
		self.account.lock().unwrap().clone()
	}

	/// Session teardown. The only path that clears the account identity.
	pub fn disconnect(&self) {
		if self.account.lock().unwrap().take().is_some() {
			info!("Wallet session disconnected");
		}
	}
}
