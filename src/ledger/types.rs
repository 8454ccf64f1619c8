//! Types for the wave-portal ledger interface

use serde::{Deserialize, Serialize};

/// A wave as recorded on the ledger.
///
/// This is the wire representation returned by the indexer: the sender address,
/// the block timestamp in Unix seconds, and the attached message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRecord {
	/// Address of the account that sent the wave.
	pub waver: String,
	/// Block timestamp in Unix seconds.
	pub timestamp: i64,
	/// Message attached to the wave. May be empty.
	pub message: String,
}

/// Status of a submitted wave transaction on the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum TxStatus {
	/// Transaction accepted but not yet finalized
	Pending,
	/// Transaction finalized by the ledger
	Confirmed,
	/// Transaction finalized as failed (e.g. reverted by the contract)
	Failed,
}

impl TxStatus {
	/// Check if the ledger has finalized this transaction one way or the other
	pub fn is_final(&self) -> bool {
		matches!(self, TxStatus::Confirmed | TxStatus::Failed)
	}
}

/// Receipt for a wave transaction that the ledger has finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveReceipt {
	/// The transaction hash.
	pub hash: String,
	/// Final status reported by the ledger.
	pub status: TxStatus,
}

/// Error types for ledger reads, writes and subscriptions
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
	#[error("GraphQL error: {0}")]
	GraphQLError(String),

	#[error("No data returned")]
	NoData,

	#[error("WebSocket error: {0}")]
	WebSocketError(#[from] tokio_tungstenite::tungstenite::Error),

	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("Wave dispatch rejected: {0}")]
	Rejected(String),

	#[error("Confirmation failed: {0}")]
	ConfirmationFailed(String),
}
