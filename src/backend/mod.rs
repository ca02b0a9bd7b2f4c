//! # Encoder Backend Module
//!
//! Astrazione unica sopra le due strategie di conversione PNG → WebP.
//!
//! ## Responsabilità:
//! - Definisce il trait `EncoderBackend` usato dal worker pool
//! - Seleziona l'implementazione una sola volta, in base a `BackendKind`
//!
//! ## Implementazioni:
//! | Backend   | Dove gira            | Accelerazione hardware |
//! |-----------|----------------------|------------------------|
//! | `library` | in-process (`image`) | no                     |
//! | `process` | ffmpeg esterno       | hint `-hwaccel`        |
//!
//! ## Contratto:
//! `convert` non fallisce mai oltre il proprio confine: ogni errore (decode, encode,
//! exit status non zero, spawn fallito) diventa un `ConversionOutcome` fallito con un
//! messaggio descrittivo. Il fallimento di un file non tocca gli altri job del batch.

pub mod library;
pub mod process;

pub use library::LibraryBackend;
pub use process::ProcessBackend;

use crate::config::{BackendConfig, BackendKind};
use crate::job::{ConversionJob, ConversionOutcome};
use async_trait::async_trait;
use std::sync::Arc;

/// Strategy that turns one PNG into one WebP file
#[async_trait]
pub trait EncoderBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Convert a single job. Failures are reported through the outcome, never returned.
    async fn convert(&self, job: &ConversionJob, config: &BackendConfig) -> ConversionOutcome;
}

/// Build the backend selected by the configuration
pub fn create_backend(kind: BackendKind) -> Arc<dyn EncoderBackend> {
    match kind {
        BackendKind::Library => Arc::new(LibraryBackend::new()),
        BackendKind::Process => Arc::new(ProcessBackend::new()),
    }
}

/// Success message shared by both backends
pub(crate) fn success_message(job: &ConversionJob, config: &BackendConfig) -> String {
    if config.lossless {
        format!("Converted (lossless): {} -> {}", job.source_name(), job.output_name())
    } else {
        format!(
            "Converted (quality {}): {} -> {}",
            config.quality,
            job.source_name(),
            job.output_name()
        )
    }
}
