//! # Result Aggregator Module
//!
//! Accumulatore thread-safe dei risultati del batch, protetto da un unico lock.
//!
//! `total` è il numero di job enumerati, annunciato dal pool prima di partire.
//! Ogni `record` stampa la riga del file e poi aggiorna contatori e log dei messaggi
//! dentro la stessa sezione critica, quindi l'ordine delle righe stampate coincide
//! con l'ordine del log (ordine di completamento, non ordine dei job).

use crate::job::ConversionOutcome;
use crate::json_output::JsonMessage;
use crate::progress::ProgressManager;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Counters and message log for a batch.
///
/// `succeeded <= total` and `ordered_messages.len() <= total` at all times; the two
/// lengths are equal only once every job has an outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub total: usize,
    pub succeeded: usize,
    pub ordered_messages: Vec<String>,
}

impl AggregateResult {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Every job has produced its outcome
    pub fn is_complete(&self) -> bool {
        self.ordered_messages.len() == self.total
    }
}

/// Where each completed file is reported
#[derive(Clone)]
pub enum Reporter {
    /// Human-readable line above the progress bar
    Progress(ProgressManager),
    /// One `file_complete` JSON message per file
    Json,
    /// Custom sink for library callers
    Callback(Arc<dyn Fn(&ConversionOutcome) + Send + Sync>),
    /// Nothing printed
    Silent,
}

/// Shared handle to the aggregate state; cheap to clone into every worker
#[derive(Clone)]
pub struct ResultAggregator {
    state: Arc<Mutex<AggregateResult>>,
    reporter: Reporter,
}

impl ResultAggregator {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            state: Arc::new(Mutex::new(AggregateResult::default())),
            reporter,
        }
    }

    /// Aggregator that only collects, used by tests and library callers
    pub fn silent() -> Self {
        Self::new(Reporter::Silent)
    }

    /// Announce how many outcomes the batch will produce
    pub async fn set_total(&self, total: usize) {
        self.state.lock().await.total = total;
    }

    /// Record exactly one outcome. Safe to call from any number of workers.
    ///
    /// The line is reported before the counters move, so a reporter that panics
    /// leaves the outcome unrecorded.
    pub async fn record(&self, outcome: ConversionOutcome) {
        let mut state = self.state.lock().await;

        match &self.reporter {
            Reporter::Progress(progress) => progress.file_done(&outcome.message, &outcome.job.source_name()),
            Reporter::Json => JsonMessage::file_complete(
                outcome.job.source_path().to_path_buf(),
                outcome.job.output_path().to_path_buf(),
                outcome.success,
                outcome.message.clone(),
            )
            .emit(),
            Reporter::Callback(callback) => callback(&outcome),
            Reporter::Silent => {}
        }

        if outcome.success {
            state.succeeded += 1;
        }
        state.ordered_messages.push(outcome.message);

        // Without an announced total, every outcome extends it
        if state.ordered_messages.len() > state.total {
            state.total = state.ordered_messages.len();
        }
    }

    /// `(succeeded, total)`; meaningful once the pool has returned
    pub async fn summary(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.succeeded, state.total)
    }

    /// Copy of the full aggregate state
    pub async fn snapshot(&self) -> AggregateResult {
        self.state.lock().await.clone()
    }

    /// Finish the progress bar, if any
    pub fn finish(&self, message: &str) {
        if let Reporter::Progress(progress) = &self.reporter {
            progress.finish(message);
        }
    }
}
