//! Progress tracking for wave submission.
//!
//! This module provides the `ProgressTracker`, which records the current stage
//! of an in-flight wave submission as a shared surface read by presentation
//! logic. Stages map to fixed percentages; terminal stages return to idle
//! after a scheduled reset so the surface is never left stuck mid-progress.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Stages of the wave submission lifecycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubmitStage {
    /// No submission in flight.
    Idle,
    /// Provider checked, message taken at the boundary.
    Validating,
    /// Ledger client session bound to the sender account.
    ContractBound,
    /// Pre-submission total read from the ledger.
    CountFetched,
    /// Write dispatched, pending-transaction handle obtained.
    TxSubmitted,
    /// Ledger confirmed the transaction.
    TxConfirmed,
    /// Post-submission total read back; the success terminal.
    CountRefreshed,
    /// The failure terminal. Progress is already back at zero.
    Failed,
}

impl SubmitStage {
    /// Percentage shown for this stage, in [0, 100].
    pub fn percent(&self) -> u8 {
        match self {
            SubmitStage::Idle => 0,
            SubmitStage::Validating => 17,
            SubmitStage::ContractBound => 33,
            SubmitStage::CountFetched => 50,
            SubmitStage::TxSubmitted => 67,
            SubmitStage::TxConfirmed => 83,
            SubmitStage::CountRefreshed => 100,
            SubmitStage::Failed => 0,
        }
    }

    /// Terminal stages are the only ones a scheduled reset may clear.
    fn is_terminal(&self) -> bool {
        matches!(self, SubmitStage::CountRefreshed | SubmitStage::Failed)
    }
}

/// Snapshot of the submission progress surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitProgress {
    pub stage: SubmitStage,
    pub percent: u8,
}

/// Shared tracker for submission progress.
///
/// Clones share the same underlying stage, so the controller can advance it
/// while readers observe it.
#[derive(Clone)]
pub struct ProgressTracker {
    stage: Arc<Mutex<SubmitStage>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            stage: Arc::new(Mutex::new(SubmitStage::Idle)),
        }
    }

    /// The current stage and its percentage.
    pub fn current(&self) -> SubmitProgress {
        let stage = *self.stage.lock().unwrap();
        SubmitProgress {
            stage,
            percent: stage.percent(),
        }
    }

    /// Record that the submission reached the given stage.
    pub fn advance(&self, stage: SubmitStage) {
        debug!("Submission progress: {:?} ({}%)", stage, stage.percent());
        *self.stage.lock().unwrap() = stage;
    }

    /// Record a failed submission. Progress drops to zero synchronously and
    /// the stage returns to idle with no delay.
    pub fn fail(&self) {
        {
            let mut stage = self.stage.lock().unwrap();
            warn!("Submission failed while {:?}, progress reset", *stage);
            *stage = SubmitStage::Failed;
        }
        self.schedule_reset(Duration::ZERO);
    }

    /// Return the surface to idle after `delay`, but only if the stage is
    /// still terminal by then. A submission started in the meantime keeps its
    /// own progress.
    pub fn schedule_reset(&self, delay: Duration) {
        let shared = Arc::clone(&self.stage);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut stage = shared.lock().unwrap();
            if stage.is_terminal() {
                *stage = SubmitStage::Idle;
            }
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
