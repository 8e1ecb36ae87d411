//! Debounced validation.
//!
//! Each session has at most one pending validation pass. Scheduling a new pass
//! cancels the pending one, so a burst of edits collapses into a single run
//! over the final state once the editor has been quiet for the debounce
//! interval. Finished reports arrive on a channel and are installed with
//! [`TreeStore::accept_validation`](crate::store::TreeStore::accept_validation),
//! which drops anything computed for an older revision.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use dialog_model::DialogTree;

use crate::config::EditorConfig;
use crate::store::SessionId;
use crate::validation::{ValidationReport, Validator};

/// A snapshot queued for validation, with the validator its session gates
/// saves through.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub session: SessionId,
    pub revision: u64,
    pub tree: DialogTree,
    pub validator: Validator,
}

/// Findings for one queued snapshot.
#[derive(Debug, Clone)]
pub struct ScheduledValidation {
    pub session: SessionId,
    pub revision: u64,
    pub report: ValidationReport,
}

/// A pass still waiting on its debounce, keyed by session.
struct PendingPass {
    revision: u64,
    token: CancellationToken,
}

pub struct ValidationScheduler {
    interval: Duration,
    pending: HashMap<SessionId, PendingPass>,
    results_tx: mpsc::UnboundedSender<ScheduledValidation>,
    results_rx: mpsc::UnboundedReceiver<ScheduledValidation>,
}

impl ValidationScheduler {
    /// Passes are spawned on the ambient tokio runtime, so [`Self::schedule`]
    /// must be called from within one.
    pub fn new(interval: Duration) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            interval,
            pending: HashMap::new(),
            results_tx,
            results_rx,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.scheduler.debounce())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Queue a pass for `request`, cancelling any pass still pending for the
    /// same session.
    pub fn schedule(&mut self, request: ValidationRequest) {
        let token = CancellationToken::new();
        let pass = PendingPass {
            revision: request.revision,
            token: token.clone(),
        };
        if let Some(previous) = self.pending.insert(request.session, pass) {
            previous.token.cancel();
        }

        let tx = self.results_tx.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::debug!(
                        "scheduler: validation of revision {} superseded",
                        request.revision
                    );
                }
                _ = tokio::time::sleep(interval) => {
                    let report = request.validator.validate(&request.tree);
                    let result = ScheduledValidation {
                        session: request.session,
                        revision: request.revision,
                        report,
                    };
                    if tx.send(result).is_err() {
                        log::debug!("scheduler: result dropped, scheduler gone");
                    }
                }
            }
        });
    }

    /// Cancel the pending pass for `session`, if any.
    pub fn cancel(&mut self, session: SessionId) {
        if let Some(pass) = self.pending.remove(&session) {
            pass.token.cancel();
        }
    }

    /// Cancel every pending pass.
    pub fn cancel_all(&mut self) {
        for (_, pass) in self.pending.drain() {
            pass.token.cancel();
        }
    }

    /// Wait for the next finished pass.
    pub async fn next_result(&mut self) -> Option<ScheduledValidation> {
        let result = self.results_rx.recv().await?;
        self.forget_if_current(&result);
        Some(result)
    }

    /// Collect every pass that has already finished (non-blocking).
    pub fn drain_ready(&mut self) -> Vec<ScheduledValidation> {
        let mut ready = Vec::new();
        while let Ok(result) = self.results_rx.try_recv() {
            self.forget_if_current(&result);
            ready.push(result);
        }
        ready
    }

    /// Stop tracking the pass that produced `result`. A newer pass scheduled
    /// while the result sat in the channel stays tracked so it can still be
    /// cancelled.
    fn forget_if_current(&mut self, result: &ScheduledValidation) {
        if self
            .pending
            .get(&result.session)
            .is_some_and(|pass| pass.revision == result.revision)
        {
            self.pending.remove(&result.session);
        }
    }

    /// Number of sessions with a pass still tracked.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for ValidationScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
