//! Wallet provider interface
//!
//! The wallet provider is the user's external signing and identity agent.
//! This crate only ever asks it two things: which accounts it has already
//! authorized, and to prompt the user for authorization. Absence of a
//! provider is a normal environment state, not an error, and is modeled as
//! `Option<Arc<dyn WalletProvider>>` on the portal context.

use std::sync::atomic::{AtomicBool, Ordering};

/// Error types for wallet provider and session operations
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
	#[error("No wallet provider available")]
	ProviderUnavailable,

	#[error("Authorization request rejected by the user")]
	UserRejected,

	#[error("Provider error: {0}")]
	Provider(String),
}

/// The user's signing/identity agent.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
	/// List accounts the user has already authorized, without prompting.
	async fn authorized_accounts(&self) -> Result<Vec<String>, WalletError>;

	/// Prompt the user to authorize accounts. May fail with `UserRejected`.
	async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
}

/// Headless provider holding a fixed account list.
///
/// Grants on the first prompt and reports the grant on later passive checks,
/// standing in for a browser wallet extension in an unattended process.
pub struct StaticWalletProvider {
	accounts: Vec<String>,
	granted: AtomicBool,
}

impl StaticWalletProvider {
	pub fn new(account: impl Into<String>) -> Self {
		Self {
			accounts: vec![account.into()],
			granted: AtomicBool::new(false),
		}
	}
}

#[async_trait::async_trait]
impl WalletProvider for StaticWalletProvider {
	async fn authorized_accounts(&self) -> Result<Vec<String>, WalletError> {
		if self.granted.load(Ordering::SeqCst) {
			Ok(self.accounts.clone())
		} else {
			Ok(Vec::new())
		}
	}

	async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
		if self.accounts.is_empty() {
			return Err(WalletError::UserRejected);
		}
		self.granted.store(true, Ordering::SeqCst);
		Ok(self.accounts.clone())
	}
}
