//! In-memory ledger client used by the submission and subscription tests.

use super::{
	LedgerClient, LedgerError, PendingWave, TxStatus, WaveEventStream, WaveReceipt, WaveRecord,
};
use futures_util::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Observer invoked with the name of each ledger call, so tests can sample
/// controller state mid-flight.
pub type CallHook = Arc<dyn Fn(&'static str) + Send + Sync>;

/// How the mock resolves a dispatched wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// Dispatch and confirmation both succeed.
	Confirm,
	/// The write call itself is rejected.
	RejectDispatch,
	/// Dispatch succeeds but the ledger finalizes the transaction as failed.
	FailConfirmation,
	/// Dispatch succeeds and confirmation never resolves.
	NeverConfirm,
}

/// Scriptable in-memory `LedgerClient`.
pub struct MockLedger {
	/// Waves returned by `get_all_waves`.
	pub records: Mutex<Vec<WaveRecord>>,
	/// Counts returned by successive `get_total_waves` calls; the last value
	/// is sticky once the queue runs down to one.
	pub totals: Mutex<VecDeque<u64>>,
	/// Items delivered once through the push subscription, errors included.
	pub events: Mutex<Vec<Result<WaveRecord, LedgerError>>>,
	/// Behavior of `submit_wave` and the pending handle it returns.
	pub outcome: Mutex<SubmitOutcome>,
	/// When set, `get_all_waves` and `get_total_waves` fail.
	pub fail_reads: AtomicBool,
	/// Number of times a subscription was opened.
	pub subscribe_calls: AtomicUsize,
	hook: Mutex<Option<CallHook>>,
}

impl MockLedger {
	pub fn new() -> Self {
		Self {
			records: Mutex::new(Vec::new()),
			totals: Mutex::new(VecDeque::new()),
			events: Mutex::new(Vec::new()),
			outcome: Mutex::new(SubmitOutcome::Confirm),
			fail_reads: AtomicBool::new(false),
			subscribe_calls: AtomicUsize::new(0),
			hook: Mutex::new(None),
		}
	}

	pub fn with_totals(self, totals: &[u64]) -> Self {
		*self.totals.lock().unwrap() = totals.iter().copied().collect();
		self
	}

	pub fn with_outcome(self, outcome: SubmitOutcome) -> Self {
		*self.outcome.lock().unwrap() = outcome;
		self
	}

	pub fn with_events(self, events: Vec<WaveRecord>) -> Self {
		*self.events.lock().unwrap() = events.into_iter().map(Ok).collect();
		self
	}

	pub fn with_event_results(self, events: Vec<Result<WaveRecord, LedgerError>>) -> Self {
		*self.events.lock().unwrap() = events;
		self
	}

	pub fn with_failing_reads(self) -> Self {
		self.fail_reads.store(true, Ordering::SeqCst);
		self
	}

	pub fn set_hook(&self, hook: CallHook) {
		*self.hook.lock().unwrap() = Some(hook);
	}

	fn touch(&self, call: &'static str) {
		if let Some(hook) = self.hook.lock().unwrap().as_ref() {
			hook(call);
		}
	}
}

#[async_trait::async_trait]
impl LedgerClient for MockLedger {
	async fn get_all_waves(&self) -> Result<Vec<WaveRecord>, LedgerError> {
		self.touch("get_all_waves");
		if self.fail_reads.load(Ordering::SeqCst) {
			return Err(LedgerError::GraphQLError("wave query failed".to_string()));
		}
		Ok(self.records.lock().unwrap().clone())
	}

	async fn get_total_waves(&self) -> Result<u64, LedgerError> {
		self.touch("get_total_waves");
		if self.fail_reads.load(Ordering::SeqCst) {
			return Err(LedgerError::GraphQLError("count query failed".to_string()));
		}
		let mut totals = self.totals.lock().unwrap();
		if totals.len() > 1 {
			Ok(totals.pop_front().unwrap())
		} else {
			Ok(totals.front().copied().unwrap_or(0))
		}
	}

	async fn submit_wave(
		&self,
		_from: &str,
		_message: &str,
	) -> Result<Box<dyn PendingWave>, LedgerError> {
		self.touch("submit_wave");
		let outcome = *self.outcome.lock().unwrap();
		if outcome == SubmitOutcome::RejectDispatch {
			return Err(LedgerError::Rejected("wallet rejected the wave".to_string()));
		}
		Ok(Box::new(MockPendingWave {
			outcome,
			hook: self.hook.lock().unwrap().clone(),
		}))
	}

	async fn subscribe_new_waves(&self) -> Result<WaveEventStream, LedgerError> {
		self.touch("subscribe_new_waves");
		self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
		let events: Vec<_> = std::mem::take(&mut *self.events.lock().unwrap());
		Ok(futures_util::stream::iter(events).boxed())
	}
}

struct MockPendingWave {
	outcome: SubmitOutcome,
	hook: Option<CallHook>,
}

#[async_trait::async_trait]
impl PendingWave for MockPendingWave {
	fn hash(&self) -> &str {
		"0xmockwave"
	}

	async fn await_confirmation(self: Box<Self>) -> Result<WaveReceipt, LedgerError> {
		if let Some(hook) = &self.hook {
			hook("await_confirmation");
		}
		match self.outcome {
			SubmitOutcome::Confirm => Ok(WaveReceipt {
				hash: "0xmockwave".to_string(),
				status: TxStatus::Confirmed,
			}),
			SubmitOutcome::FailConfirmation => Err(LedgerError::ConfirmationFailed(
				"transaction 0xmockwave failed on the ledger".to_string(),
			)),
			SubmitOutcome::NeverConfirm => std::future::pending().await,
			SubmitOutcome::RejectDispatch => unreachable!("rejected at dispatch"),
		}
	}
}
