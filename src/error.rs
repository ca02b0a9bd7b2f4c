//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare gli errori di setup e di conversione
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `DirectoryNotFound` / `NotADirectory`: Directory di input non valida (errore di setup)
//! - `DirectoryRead`: Directory di input non leggibile durante la scansione
//! - `Io`: Errori di I/O (permessi, disco pieno, etc.)
//! - `Image`: Errori di decode/encode dell'immagine (PNG corrotti, color mode non supportati)
//! - `Encoder`: Encoder esterno terminato con exit status non zero
//! - `MissingDependency`: Encoder esterno (ffmpeg) non disponibile
//! - `Validation`: Parametri di input non validi
//! - `Config`: File di configurazione non leggibile
//!
//! Gli errori di setup interrompono l'intera esecuzione; gli errori per singolo
//! file vengono convertiti in `ConversionOutcome` falliti dal backend.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !input_dir.exists() {
//!     return Err(ConvertError::DirectoryNotFound(input_dir.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for batch conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("Input folder '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read directory '{}': {}", .0.display(), .1)]
    DirectoryRead(PathBuf, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Invalid option: {0}")]
    Validation(String),

    #[error("Configuration file error: {0}")]
    Config(String),
}
