//! # PNG to WebP Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `job`: Job di conversione e relativo esito
//! - `file_manager`: Discovery dei PNG e creazione dei job
//! - `backend`: Encoder WebP in-process (`image`) o esterno (ffmpeg)
//! - `converter`: Orchestratore, worker pool e aggregazione risultati
//! - `platform`: Risoluzione cross-platform dell'encoder esterno
//! - `progress`: Progress bar
//! - `json_output`: Eventi JSON per l'uso da script
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use png_webp_converter::{BatchConverter, Config};
//!
//! let config = Config { workers: 4, ..Default::default() };
//! let summary = BatchConverter::new(&path, config)?.run().await?;
//! println!("{}/{}", summary.succeeded, summary.total);
//! ```

pub mod backend;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod job;
pub mod json_output;
pub mod platform;
pub mod progress;
pub mod utils;

pub use backend::{create_backend, EncoderBackend};
pub use config::{BackendConfig, BackendKind, Config};
pub use converter::{BatchConverter, ConversionSummary};
pub use error::ConvertError;
pub use job::{ConversionJob, ConversionOutcome};
