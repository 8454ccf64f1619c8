//! Wave submission controller.
//!
//! Orchestrates the full submit lifecycle against the ledger: validate,
//! bind the sender, read the advisory pre-count, dispatch the write, wait for
//! confirmation, and re-read the authoritative count. Progress is recorded
//! after each completed step. Any failure aborts the whole operation with no
//! partial state mutation; the submitted wave itself only ever reaches the
//! store through the live subscription, since the ledger is the single source
//! of truth.

use crate::context::PortalContext;
use crate::ledger::LedgerError;
use crate::wallet::WalletSession;
use crate::waves::progress::{ProgressTracker, SubmitProgress, SubmitStage};
use crate::waves::store::SharedWaveStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for wave submission.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Upper bound on the wait for ledger confirmation.
    pub confirmation_timeout: Duration,
    /// Delay before a completed submission's progress returns to idle.
    pub reset_delay: Duration,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(60),
            reset_delay: Duration::from_secs(2),
        }
    }
}

/// Errors surfaced by [`WaveSubmissionController::submit`].
///
/// Every variant aborts the whole operation; the caller decides whether to
/// re-invoke. No retry happens here.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("No wallet provider available")]
    NoWalletProvider,

    #[error("No authorized account to sign with")]
    SigningUnavailable,

    #[error("Ledger read failed: {0}")]
    LedgerRead(#[source] LedgerError),

    #[error("Wave submission rejected: {0}")]
    SubmissionRejected(#[source] LedgerError),

    #[error("Confirmation timed out after {0:?}")]
    ConfirmationTimeout(Duration),

    #[error("Confirmation failed: {0}")]
    ConfirmationFailed(#[source] LedgerError),
}

/// Coordinator for the submit lifecycle.
pub struct WaveSubmissionController {
    context: Arc<PortalContext>,
    session: Arc<WalletSession>,
    store: SharedWaveStore,
    progress: ProgressTracker,
    config: SubmitConfig,
    /// Last authoritative total reported by the ledger. Updated on success
    /// only, so failed submissions leave it untouched.
    wave_count: Mutex<u64>,
}

impl WaveSubmissionController {
    pub fn new(
        context: Arc<PortalContext>,
        session: Arc<WalletSession>,
        store: SharedWaveStore,
        config: SubmitConfig,
    ) -> Self {
        Self {
            context,
            session,
            store,
            progress: ProgressTracker::new(),
            config,
            wave_count: Mutex::new(0),
        }
    }

    /// Current submission progress.
    pub fn progress(&self) -> SubmitProgress {
        self.progress.current()
    }

    /// Shared handle onto the progress surface.
    pub fn progress_handle(&self) -> ProgressTracker {
        self.progress.clone()
    }

    /// Last authoritative wave count. Advisory; may lag the store's length.
    pub fn wave_count(&self) -> u64 {
        *self.wave_count.lock().unwrap()
    }

    /// Submit one wave and wait for the ledger to confirm it.
    ///
    /// Returns the refreshed total wave count on success. All-or-nothing: on
    /// any failure neither the wave count nor the store is mutated, and
    /// progress is back at zero when the call returns.
    pub async fn submit(&self, message: &str) -> Result<u64, SubmissionError> {
        if !self.context.has_provider() {
            warn!("Wave submission attempted without a wallet provider");
            return Err(SubmissionError::NoWalletProvider);
        }

        // Content validation is the contract's business; only trim at the
        // boundary. An empty message is forwarded as-is.
        let message = message.trim();
        self.progress.advance(SubmitStage::Validating);

        match self.run(message).await {
            Ok(count) => {
                *self.wave_count.lock().unwrap() = count;
                self.progress.schedule_reset(self.config.reset_delay);
                Ok(count)
            }
            Err(e) => {
                self.progress.fail();
                Err(e)
            }
        }
    }

    async fn run(&self, message: &str) -> Result<u64, SubmissionError> {
        let sender = self
            .session
            .current_account()
            .ok_or(SubmissionError::SigningUnavailable)?;
        self.progress.advance(SubmitStage::ContractBound);

        let pre_count = self
            .context
            .ledger
            .get_total_waves()
            .await
            .map_err(SubmissionError::LedgerRead)?;
        info!(
            "Retrieved total wave count: {} ({} in the local store)",
            pre_count,
            self.store.lock().unwrap().len()
        );
        self.progress.advance(SubmitStage::CountFetched);

        let pending = self
            .context
            .ledger
            .submit_wave(&sender, message)
            .await
            .map_err(SubmissionError::SubmissionRejected)?;
        info!("Mining... {}", pending.hash());
        self.progress.advance(SubmitStage::TxSubmitted);

        let receipt = tokio::time::timeout(
            self.config.confirmation_timeout,
            pending.await_confirmation(),
        )
        .await
        .map_err(|_| SubmissionError::ConfirmationTimeout(self.config.confirmation_timeout))?
        .map_err(SubmissionError::ConfirmationFailed)?;
        info!("Mined -- {}", receipt.hash);
        self.progress.advance(SubmitStage::TxConfirmed);

        let post_count = self
            .context
            .ledger
            .get_total_waves()
            .await
            .map_err(SubmissionError::LedgerRead)?;
        info!("Retrieved total wave count: {}", post_count);
        self.progress.advance(SubmitStage::CountRefreshed);

        Ok(post_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::WaveRecord;
    use crate::ledger::testing::{MockLedger, SubmitOutcome};
    use crate::wallet::{StaticWalletProvider, WalletProvider};
    use crate::waves::store::{WaveEntry, WaveStore};
    use std::sync::atomic::Ordering;

    async fn controller_with(
        ledger: Arc<MockLedger>,
        with_provider: bool,
        authorize: bool,
    ) -> WaveSubmissionController {
        let provider: Option<Arc<dyn WalletProvider>> = if with_provider {
            Some(Arc::new(StaticWalletProvider::new("0xAA")))
        } else {
            None
        };
        let context = PortalContext::new(ledger, provider);
        let session = Arc::new(WalletSession::new(context.clone()));
        if authorize {
            session.request_authorization().await.unwrap();
        }
        WaveSubmissionController::new(context, session, WaveStore::shared(), SubmitConfig::default())
    }

    #[tokio::test]
    async fn missing_provider_fails_before_any_ledger_call() {
        let ledger = Arc::new(MockLedger::new().with_totals(&[5]));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        ledger.set_hook(Arc::new(move |call| seen.lock().unwrap().push(call)));

        let controller = controller_with(ledger, false, false).await;
        let result = controller.submit("hello").await;

        assert!(matches!(result, Err(SubmissionError::NoWalletProvider)));
        assert_eq!(controller.progress().stage, SubmitStage::Idle);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_session_cannot_sign() {
        let ledger = Arc::new(MockLedger::new().with_totals(&[5]));
        let controller = controller_with(ledger, true, false).await;

        let result = controller.submit("hello").await;

        assert!(matches!(result, Err(SubmissionError::SigningUnavailable)));
        assert_eq!(controller.progress().percent, 0);
    }

    #[tokio::test]
    async fn rejected_dispatch_leaves_state_untouched() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_totals(&[5])
                .with_outcome(SubmitOutcome::RejectDispatch),
        );
        let controller = controller_with(ledger, true, true).await;
        controller
            .store
            .lock()
            .unwrap()
            .replace_all(vec![WaveEntry::from(WaveRecord {
                waver: "0xBB".to_string(),
                timestamp: 2000,
                message: "yo".to_string(),
            })]);

        let result = controller.submit("hello").await;

        assert!(matches!(result, Err(SubmissionError::SubmissionRejected(_))));
        assert_eq!(controller.wave_count(), 0);
        assert_eq!(controller.store.lock().unwrap().len(), 1);
        assert_eq!(controller.progress().percent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submission_returns_the_refreshed_count() {
        let ledger = Arc::new(MockLedger::new().with_totals(&[5, 6]));
        let controller = controller_with(ledger, true, true).await;

        let count = controller.submit("hello").await.unwrap();

        assert_eq!(count, 6);
        assert_eq!(controller.wave_count(), 6);
        assert_eq!(controller.progress().stage, SubmitStage::CountRefreshed);
        assert_eq!(controller.progress().percent, 100);

        // The store is only fed by the subscription path, never by submit.
        assert!(controller.store.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2010)).await;
        tokio::task::yield_now().await;
        assert_eq!(controller.progress().stage, SubmitStage::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_wait_is_bounded() {
        let ledger = Arc::new(MockLedger::new().with_outcome(SubmitOutcome::NeverConfirm));
        let controller = controller_with(ledger, true, true).await;

        let result = controller.submit("hello").await;

        assert!(matches!(result, Err(SubmissionError::ConfirmationTimeout(_))));
        assert_eq!(controller.wave_count(), 0);
        assert_eq!(controller.progress().percent, 0);
    }

    #[tokio::test]
    async fn failed_count_read_aborts_the_submission() {
        let ledger = Arc::new(MockLedger::new().with_totals(&[5]).with_failing_reads());
        let controller = controller_with(ledger, true, true).await;

        let result = controller.submit("hello").await;

        assert!(matches!(result, Err(SubmissionError::LedgerRead(_))));
        assert_eq!(controller.wave_count(), 0);
        assert_eq!(controller.progress().percent, 0);
    }

    #[tokio::test]
    async fn failed_count_refresh_aborts_after_confirmation() {
        let ledger = Arc::new(MockLedger::new().with_totals(&[5]));
        let controller = controller_with(ledger.clone(), true, true).await;

        // Let the pre-count read through, then break reads once the wave is
        // confirmed so only the refreshing read fails.
        let breaker = ledger.clone();
        ledger.set_hook(Arc::new(move |call| {
            if call == "await_confirmation" {
                breaker.fail_reads.store(true, Ordering::SeqCst);
            }
        }));

        let result = controller.submit("hello").await;

        assert!(matches!(result, Err(SubmissionError::LedgerRead(_))));
        assert_eq!(controller.wave_count(), 0);
        assert_eq!(controller.progress().percent, 0);
    }

    #[tokio::test]
    async fn failed_confirmation_surfaces_and_resets() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_totals(&[5])
                .with_outcome(SubmitOutcome::FailConfirmation),
        );
        let controller = controller_with(ledger, true, true).await;

        let result = controller.submit("hello").await;

        assert!(matches!(result, Err(SubmissionError::ConfirmationFailed(_))));
        assert_eq!(controller.wave_count(), 0);
        assert_eq!(controller.progress().percent, 0);
    }

    #[tokio::test]
    async fn progress_strictly_increases_on_the_success_path() {
        let ledger = Arc::new(MockLedger::new().with_totals(&[5, 6]));
        let controller = controller_with(ledger.clone(), true, true).await;

        let samples = Arc::new(Mutex::new(Vec::new()));
        let handle = controller.progress_handle();
        let sink = samples.clone();
        ledger.set_hook(Arc::new(move |_| {
            sink.lock().unwrap().push(handle.current().percent);
        }));

        controller.submit("hello").await.unwrap();

        // Sampled at pre-count read, dispatch, confirmation wait, post-count read.
        let samples = samples.lock().unwrap();
        assert_eq!(*samples, vec![33, 50, 67, 83]);
        assert!(samples.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(controller.progress().percent, 100);
    }
}
