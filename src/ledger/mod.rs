//! Ledger integration module for the wave portal contract
//!
//! This module defines the narrow interface the rest of the crate consumes to
//! talk to the remote ledger: bulk wave reads, the total wave count, wave
//! submission with confirmation, and the push feed of newly mined waves. It
//! also provides a concrete GraphQL client for a wave-portal indexer.

/// GraphQL client for interacting with a wave-portal indexer
mod client;
/// Type definitions for ledger data structures
mod types;

#[cfg(test)]
pub mod testing;

pub use client::PortalLedgerClient;
pub use types::*;

use futures_util::Stream;
use std::pin::Pin;

/// Push feed of newly mined waves, in arrival order.
pub type WaveEventStream = Pin<Box<dyn Stream<Item = Result<WaveRecord, LedgerError>> + Send>>;

/// A wave write accepted by the ledger but not yet finalized.
#[async_trait::async_trait]
pub trait PendingWave: Send {
	/// The transaction hash assigned at dispatch time.
	fn hash(&self) -> &str;

	/// Suspend until the ledger finalizes the transaction.
	///
	/// Resolves to a receipt once the transaction is confirmed, or an error if
	/// the ledger reports it as failed or the wait itself breaks down.
	async fn await_confirmation(self: Box<Self>) -> Result<WaveReceipt, LedgerError>;
}

/// Client interface for the wave portal contract.
///
/// All methods are async and suspend at the remote call; implementations must
/// not block. The ledger is the single source of truth for waves and counts.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
	/// Fetch every wave ever recorded, oldest first.
	async fn get_all_waves(&self) -> Result<Vec<WaveRecord>, LedgerError>;

	/// Fetch the total wave count. Advisory; may lag the actual wave list.
	async fn get_total_waves(&self) -> Result<u64, LedgerError>;

	/// Dispatch a wave write for the given sender, returning a pending handle.
	async fn submit_wave(
		&self,
		from: &str,
		message: &str,
	) -> Result<Box<dyn PendingWave>, LedgerError>;

	/// Open a push subscription for newly mined waves.
	async fn subscribe_new_waves(&self) -> Result<WaveEventStream, LedgerError>;
}
