//! # Job Model Module
//!
//! Tipi valore scambiati tra enumerator, worker pool e aggregator.
//!
//! - `ConversionJob`: coppia immutabile sorgente → destinazione
//! - `ConversionOutcome`: risultato prodotto una sola volta per ogni job

use std::path::{Path, PathBuf};

/// One source-file-to-destination-file conversion task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    source_path: PathBuf,
    output_path: PathBuf,
}

impl ConversionJob {
    pub fn new(source_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            source_path,
            output_path,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// File name of the source, for user-facing messages
    pub fn source_name(&self) -> String {
        display_name(&self.source_path)
    }

    /// File name of the output, for user-facing messages
    pub fn output_name(&self) -> String {
        display_name(&self.output_path)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Result of converting a single job
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub job: ConversionJob,
    pub success: bool,
    pub message: String,
}

impl ConversionOutcome {
    pub fn succeeded(job: ConversionJob, message: impl Into<String>) -> Self {
        Self {
            job,
            success: true,
            message: message.into(),
        }
    }

    /// Failed outcome; the message names the source file and carries the error text
    pub fn failed(job: ConversionJob, error: impl std::fmt::Display) -> Self {
        let message = format!("✗ Error converting {}: {}", job.source_name(), error);
        Self {
            job,
            success: false,
            message,
        }
    }
}
