//! Wave Lifecycle Module
//!
//! This module provides the core logic for recording and submitting waves
//! against the portal ledger. It is composed of several submodules, each
//! responsible for a specific aspect of the wave lifecycle:
//!
//! - `store`: The in-memory, deduplicated, insertion-ordered wave collection.
//! - `subscription`: The live push-feed manager that keeps the store current.
//! - `submit`: The submission controller orchestrating validate, dispatch,
//!   confirm and count refresh.
//! - `progress`: The shared progress surface the controller reports through.
//!
//! The controller and the subscription never feed the store from the same
//! path: submitted waves only become visible through the push feed, because
//! the ledger is the single source of truth.

/// Shared progress surface for wave submission
pub mod progress;
/// In-memory wave record store
pub mod store;
/// Wave submission controller
pub mod submit;
/// Live new-wave subscription manager
pub mod subscription;

pub use progress::{SubmitProgress, SubmitStage};
pub use store::{SharedWaveStore, WaveEntry, WaveStore};
pub use submit::{SubmissionError, SubmitConfig, WaveSubmissionController};
pub use subscription::LiveSubscriptionManager;
