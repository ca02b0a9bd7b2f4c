//! # Worker Pool Module
//!
//! Pool di worker di dimensione fissa che consuma la lista statica dei job.
//!
//! ## Modello:
//! - I job stanno in una coda condivisa (`Mutex<VecDeque>`)
//! - Ogni worker prende il prossimo job libero (pull model, niente partizionamento statico),
//!   così file lenti e veloci si bilanciano da soli
//! - Il lock della coda è tenuto solo per il `pop_front`, mai durante la conversione
//! - `run` ritorna solo quando tutti i worker hanno finito (barrier)
//!
//! ## Isolamento errori:
//! Un panic dentro `backend.convert` viene catturato per singolo job, loggato e
//! registrato come outcome fallito per quel job; il worker continua con il successivo.
//!
//! Se un worker termina comunque in modo anomalo (panic fuori dalla conversione),
//! dopo la barrier il job che aveva in mano e quelli rimasti in coda vengono
//! registrati come falliti: ogni job enumerato ha sempre esattamente un outcome.
//!
//! ## Ordine:
//! Con un solo worker i job sono processati nell'ordine di enumerazione; con più
//! worker l'ordine di completamento non è garantito.

use crate::backend::EncoderBackend;
use crate::config::BackendConfig;
use crate::converter::result_aggregator::{AggregateResult, ResultAggregator};
use crate::error::ConvertError;
use crate::job::{ConversionJob, ConversionOutcome};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

type JobQueue = Arc<Mutex<VecDeque<ConversionJob>>>;
/// Job currently held by each worker, keyed by worker id
type InFlight = Arc<Mutex<BTreeMap<usize, ConversionJob>>>;

/// Fixed-size pool converting a static list of independent jobs
pub struct WorkerPool {
    backend: Arc<dyn EncoderBackend>,
    config: Arc<BackendConfig>,
    concurrency: usize,
}

impl WorkerPool {
    pub fn new(
        backend: Arc<dyn EncoderBackend>,
        config: BackendConfig,
        concurrency: usize,
    ) -> Result<Self, ConvertError> {
        if concurrency == 0 {
            return Err(ConvertError::Validation(
                "Number of threads must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            backend,
            config: Arc::new(config),
            concurrency,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Convert every job, recording exactly one outcome per job, then return the aggregate.
    pub async fn run(&self, jobs: Vec<ConversionJob>, aggregator: &ResultAggregator) -> AggregateResult {
        let job_count = jobs.len();
        aggregator.set_total(job_count).await;

        let queue: JobQueue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let in_flight: InFlight = Arc::new(Mutex::new(BTreeMap::new()));

        debug!(
            "Starting {} {} workers for {} jobs",
            self.concurrency,
            self.backend.name(),
            job_count
        );

        let handles: Vec<_> = (0..self.concurrency)
            .map(|worker_id| {
                let queue = queue.clone();
                let in_flight = in_flight.clone();
                let backend = self.backend.clone();
                let config = self.config.clone();
                let aggregator = aggregator.clone();

                tokio::spawn(async move {
                    Self::worker_loop(worker_id, queue, in_flight, backend, config, aggregator).await
                })
            })
            .collect();

        for (worker_id, result) in join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = result {
                error!("Worker {} terminated abnormally: {}", worker_id, e);
            }
        }

        Self::record_lost_jobs(&queue, &in_flight, aggregator).await;
        aggregator.snapshot().await
    }

    async fn worker_loop(
        worker_id: usize,
        queue: JobQueue,
        in_flight: InFlight,
        backend: Arc<dyn EncoderBackend>,
        config: Arc<BackendConfig>,
        aggregator: ResultAggregator,
    ) -> usize {
        let mut processed = 0;

        while let Some(job) = Self::next_job(worker_id, &queue, &in_flight).await {
            debug!("Worker {} converting {}", worker_id, job.source_path().display());
            let outcome = Self::convert_isolated(backend.as_ref(), &job, &config).await;
            aggregator.record(outcome).await;
            in_flight.lock().await.remove(&worker_id);
            processed += 1;
        }

        debug!("Worker {} finished after {} jobs", worker_id, processed);
        processed
    }

    /// Claim the next unclaimed job; both locks are released on return
    async fn next_job(worker_id: usize, queue: &JobQueue, in_flight: &InFlight) -> Option<ConversionJob> {
        let job = queue.lock().await.pop_front()?;
        in_flight.lock().await.insert(worker_id, job.clone());
        Some(job)
    }

    /// Fail every job a dead worker was holding, then every job nobody claimed
    async fn record_lost_jobs(queue: &JobQueue, in_flight: &InFlight, aggregator: &ResultAggregator) {
        let abandoned: Vec<ConversionJob> = std::mem::take(&mut *in_flight.lock().await).into_values().collect();
        let unclaimed: Vec<ConversionJob> = queue.lock().await.drain(..).collect();

        for job in abandoned {
            error!("No result recorded for {}", job.source_path().display());
            aggregator
                .record(ConversionOutcome::failed(job, "worker terminated before reporting a result"))
                .await;
        }
        for job in unclaimed {
            error!("{} was never claimed by a worker", job.source_path().display());
            aggregator
                .record(ConversionOutcome::failed(job, "no worker left to convert it"))
                .await;
        }
    }

    async fn convert_isolated(
        backend: &dyn EncoderBackend,
        job: &ConversionJob,
        config: &BackendConfig,
    ) -> ConversionOutcome {
        match AssertUnwindSafe(backend.convert(job, config)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_reason(panic.as_ref());
                error!("Conversion of {} panicked: {}", job.source_path().display(), reason);
                ConversionOutcome::failed(job.clone(), format!("unexpected failure: {}", reason))
            }
        }
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
