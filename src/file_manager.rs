//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei PNG e la creazione dei job di conversione.
//!
//! ## Responsabilità:
//! - Scansione NON ricorsiva della directory di input
//! - Riconoscimento estensione `.png` case-insensitive (`.png`, `.PNG`, `.Png`, ...)
//! - Creazione della sequenza immutabile e ordinata di `ConversionJob`
//! - Deduplicazione opzionale dei job che producono lo stesso file di output
//! - Formattazione human-readable delle dimensioni
//!
//! ## Duplicati:
//! Ogni entry della directory viene visitata una sola volta, quindi lo stesso file non
//! produce mai due job. File distinti che differiscono solo per il case dell'estensione
//! (`a.png` e `a.PNG`) sono job indipendenti con lo stesso output `a.webp`: di default
//! vengono eseguiti entrambi (vince l'ultimo che scrive). Con `dedup_outputs` si tiene
//! solo il primo job per ogni output.
//!
//! ## Esempio:
//! ```rust,ignore
//! let jobs = FileManager::enumerate_jobs(Path::new("/photos"), Path::new("/webp"))?;
//! for job in &jobs {
//!     println!("{} -> {}", job.source_name(), job.output_name());
//! }
//! ```

use crate::converter::path_resolver::PathResolver;
use crate::error::ConvertError;
use crate::job::ConversionJob;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of the files picked up by the enumerator (compared case-insensitively)
pub const SOURCE_EXTENSION: &str = "png";

/// Manages file discovery and job creation
pub struct FileManager;

impl FileManager {
    /// Check that the input directory exists and is a directory
    pub fn check_input_dir(input_dir: &Path) -> Result<(), ConvertError> {
        if !input_dir.exists() {
            return Err(ConvertError::DirectoryNotFound(input_dir.to_path_buf()));
        }
        if !input_dir.is_dir() {
            return Err(ConvertError::NotADirectory(input_dir.to_path_buf()));
        }
        Ok(())
    }

    /// Find all PNG files directly inside a directory, in file-name order
    pub fn find_source_files(input_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
        Self::check_input_dir(input_dir)?;

        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && Self::is_source_format(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                // Broken entry (dangling symlink, link loop): it stays a job and fails on its own
                Err(e) if e.depth() > 0 => match e.path() {
                    Some(path) if Self::is_source_format(path) => {
                        warn!("Cannot inspect {}: {}", path.display(), e);
                        files.push(path.to_path_buf());
                    }
                    Some(path) => debug!("Skipping unreadable entry {}: {}", path.display(), e),
                    None => debug!("Skipping unreadable entry: {}", e),
                },
                Err(e) => {
                    let path = e.path().unwrap_or(input_dir).to_path_buf();
                    return Err(ConvertError::DirectoryRead(path, e.to_string()));
                }
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Found {} PNG files in {}", files.len(), input_dir.display());
        Ok(files)
    }

    /// Enumerate one conversion job per PNG file found in `input_dir`
    pub fn enumerate_jobs(input_dir: &Path, output_dir: &Path) -> Result<Vec<ConversionJob>, ConvertError> {
        Self::find_source_files(input_dir)?
            .into_iter()
            .map(|source| {
                let output = PathResolver::get_output_path(&source, output_dir)
                    .map_err(|e| ConvertError::Validation(e.to_string()))?;
                Ok(ConversionJob::new(source, output))
            })
            .collect()
    }

    /// Keep only the first job for each output path
    pub fn dedup_by_output(jobs: Vec<ConversionJob>) -> Vec<ConversionJob> {
        let mut seen = HashSet::new();
        jobs.into_iter()
            .filter(|job| {
                let first = seen.insert(job.output_path().to_path_buf());
                if !first {
                    warn!(
                        "Skipping {}: output {} is already produced by another file",
                        job.source_path().display(),
                        job.output_path().display()
                    );
                }
                first
            })
            .collect()
    }

    /// Check if a file has the source extension
    pub fn is_source_format(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SOURCE_EXTENSION))
            .unwrap_or(false)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
