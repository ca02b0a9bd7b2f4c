//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (una riga per evento su stdout)
//! per l'uso da script e altri processi.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio batch (directory, numero di file, configurazione)
//! - `file_complete`: Fine conversione di un file (successo o errore)
//! - `complete`: Fine batch con `succeeded/total`
//! - `error`: Errore di setup che interrompe l'esecuzione

use crate::config::{BackendKind, Config};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del batch
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Fine conversione di un file
    #[serde(rename = "file_complete")]
    FileComplete {
        source: PathBuf,
        output: PathBuf,
        success: bool,
        message: String,
    },

    /// Batch completato
    #[serde(rename = "complete")]
    Complete {
        succeeded: usize,
        total: usize,
        duration_seconds: f64,
    },

    /// Errore di setup
    #[serde(rename = "error")]
    Error { message: String },
}

/// Configurazione riportata nel messaggio di start
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub quality: u8,
    pub lossless: bool,
    pub workers: usize,
    pub backend: BackendKind,
    pub use_hardware_accel: bool,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            let _ = writeln!(std::io::stdout().lock(), "{}", json);
        }
    }

    pub fn start(input_dir: PathBuf, output_dir: PathBuf, total_files: usize, config: JsonConfig) -> Self {
        Self::Start {
            input_dir,
            output_dir,
            total_files,
            config,
        }
    }

    pub fn file_complete(source: PathBuf, output: PathBuf, success: bool, message: String) -> Self {
        Self::FileComplete {
            source,
            output,
            success,
            message,
        }
    }

    pub fn complete(succeeded: usize, total: usize, duration_seconds: f64) -> Self {
        Self::Complete {
            succeeded,
            total,
            duration_seconds,
        }
    }

    pub fn error(message: String) -> Self {
        Self::Error { message }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            quality: config.quality,
            lossless: config.lossless,
            workers: config.workers,
            backend: config.backend,
            use_hardware_accel: config.use_hardware_accel,
        }
    }
}
