//! # Path Resolution Module
//!
//! Centralizza la logica di calcolo dei path di output.
//! Il nome di output dipende solo dal nome del sorgente: stesso stem, estensione `.webp`,
//! dentro la directory di output risolta.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of every produced artifact
pub const TARGET_EXTENSION: &str = "webp";

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola il path di output per un file sorgente
    pub fn get_output_path(source_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        let file_name = source_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", source_path.display()))?;

        let result = output_dir
            .join(file_name)
            .with_extension(TARGET_EXTENSION);
        debug!("Resolved output path: {} -> {}", source_path.display(), result.display());

        Ok(result)
    }

    /// Risolve la directory di output: quella configurata, oppure la directory di input
    pub fn resolve_output_dir(input_dir: &Path, configured: Option<&Path>) -> PathBuf {
        configured
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input_dir.to_path_buf())
    }

    /// Crea la directory di output (con i parent) se necessario
    pub async fn ensure_output_dir(path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create output directory {}: {}", path.display(), e))?;
        Ok(())
    }
}
