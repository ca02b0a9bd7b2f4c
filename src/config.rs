//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Fornisce validazione dei parametri prima di toccare il filesystem
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Deriva la `BackendConfig` immutabile condivisa dai worker
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità WebP (0-100, default: 95)
//! - `lossless`: Compressione lossless, ignora `quality` (default: false)
//! - `workers`: Numero di worker paralleli (default: 1 = sequenziale)
//! - `backend`: `library` (in-process) o `process` (ffmpeg)
//! - `use_hardware_accel`: Hint di decode hardware per ffmpeg (solo backend `process`)
//! - `hwaccel_device`: Device passato a `-hwaccel` (default: "cuda")
//! - `encoder_binary`: Eseguibile dell'encoder esterno (default: "ffmpeg")
//! - `output_path`: Directory di output (default: None = stessa directory dell'input)
//! - `dedup_outputs`: Scarta job che producono lo stesso file di output
//! - `json_output`: Eventi JSON su stdout invece dell'output testuale
//!
//! ## Validazione:
//! - Controlla che quality sia 0-100
//! - Controlla che workers sia > 0
//! - Controlla che l'accelerazione hardware sia richiesta solo con il backend `process`
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality: 80,
//!     workers: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ConvertError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which encoder implementation converts each job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process decode and encode through the `image` crate
    #[default]
    Library,
    /// External encoder process (ffmpeg)
    Process,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Library => write!(f, "library"),
            BackendKind::Process => write!(f, "process"),
        }
    }
}

/// Configuration for a batch conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WebP quality (0-100)
    pub quality: u8,
    /// Lossless encoding, `quality` is ignored when set
    pub lossless: bool,
    /// Number of parallel workers
    pub workers: usize,
    /// Encoder backend
    pub backend: BackendKind,
    /// Ask the external encoder for hardware-accelerated decode
    pub use_hardware_accel: bool,
    /// Device name passed to the external encoder's `-hwaccel` option
    pub hwaccel_device: String,
    /// External encoder executable
    pub encoder_binary: PathBuf,
    /// Output directory (None = write next to the source files)
    pub output_path: Option<PathBuf>,
    /// Keep only the first job for each output path
    pub dedup_outputs: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: 95,
            lossless: false,
            workers: 1,
            backend: BackendKind::Library,
            use_hardware_accel: false,
            hwaccel_device: "cuda".to_string(),
            encoder_binary: PathBuf::from("ffmpeg"),
            output_path: None,
            dedup_outputs: false,
            json_output: false,
        }
    }
}

/// Encoding parameters shared read-only by every worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub quality: u8,
    pub lossless: bool,
    pub use_hardware_accel: bool,
    pub hwaccel_device: String,
    pub encoder_binary: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Config::default().backend_config()
    }
}

impl Config {
    /// Validate configuration parameters.
    ///
    /// Pure check: nothing on disk is created or touched.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.quality > 100 {
            return Err(ConvertError::Validation(
                "Quality must be between 0 and 100".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(ConvertError::Validation(
                "Number of threads must be at least 1".to_string(),
            ));
        }

        if self.use_hardware_accel && self.backend != BackendKind::Process {
            return Err(ConvertError::Validation(
                "Hardware acceleration requires the process backend (--backend process)".to_string(),
            ));
        }

        if self.use_hardware_accel && self.hwaccel_device.trim().is_empty() {
            return Err(ConvertError::Validation(
                "Hardware acceleration device must not be empty".to_string(),
            ));
        }

        if let Some(ref output_path) = self.output_path {
            if output_path.exists() && !output_path.is_dir() {
                return Err(ConvertError::Validation(format!(
                    "Output path is not a directory: {}",
                    output_path.display()
                )));
            }
        }

        Ok(())
    }

    /// Immutable view used by the encoder backends
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            quality: self.quality,
            lossless: self.lossless,
            use_hardware_accel: self.use_hardware_accel,
            hwaccel_device: self.hwaccel_device.clone(),
            encoder_binary: self.encoder_binary.clone(),
        }
    }

    /// Load configuration from file and validate it
    pub async fn from_file(path: &Path) -> Result<Self> {
        let config = Self::read_file(path).await?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file without validating it.
    ///
    /// Used when further values are layered on top; validate the merged result.
    pub async fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConvertError::Config(format!(
                "Config file does not exist: {}",
                path.display()
            ))
            .into());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConvertError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Check a raw quality value coming from the command line
pub fn validate_quality(value: i64) -> Result<u8, ConvertError> {
    u8::try_from(value)
        .ok()
        .filter(|quality| *quality <= 100)
        .ok_or_else(|| ConvertError::Validation("Quality must be between 0 and 100".to_string()))
}

/// Check a raw worker count coming from the command line
pub fn validate_workers(value: i64) -> Result<usize, ConvertError> {
    usize::try_from(value)
        .ok()
        .filter(|workers| *workers >= 1)
        .ok_or_else(|| ConvertError::Validation("Number of threads must be at least 1".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.quality = 101;
        assert!(config.validate().is_err());

        config.quality = 100;
        config.workers = 0;
        assert!(config.validate().is_err());

        config.workers = 4;
        config.use_hardware_accel = true;
        assert!(config.validate().is_err(), "hwaccel needs the process backend");

        config.backend = BackendKind::Process;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_quality_bounds() {
        assert!(validate_quality(-1).is_err());
        assert!(validate_quality(101).is_err());
        assert_eq!(validate_quality(0).unwrap(), 0);
        assert_eq!(validate_quality(100).unwrap(), 100);
    }

    #[test]
    fn test_validate_workers_bounds() {
        assert!(validate_workers(0).is_err());
        assert!(validate_workers(-3).is_err());
        assert_eq!(validate_workers(1).unwrap(), 1);
        assert_eq!(validate_workers(16).unwrap(), 16);
    }

    #[test]
    fn test_validation_does_not_create_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");

        let config = Config {
            workers: 0,
            output_path: Some(output.clone()),
            ..Default::default()
        };

        assert!(config.validate().is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_output_path_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();

        let config = Config {
            output_path: Some(file),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConvertError::Validation(_))));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.quality, 95);
        assert!(!config.lossless);
        assert_eq!(config.workers, 1);
        assert_eq!(config.backend, BackendKind::Library);
        assert_eq!(config.encoder_binary, PathBuf::from("ffmpeg"));
        assert!(config.output_path.is_none());
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            quality: 70,
            lossless: true,
            workers: 8,
            backend: BackendKind::Process,
            use_hardware_accel: true,
            hwaccel_device: "vaapi".to_string(),
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.quality, 70);
        assert!(loaded_config.lossless);
        assert_eq!(loaded_config.workers, 8);
        assert_eq!(loaded_config.backend, BackendKind::Process);
        assert!(loaded_config.use_hardware_accel);
        assert_eq!(loaded_config.hwaccel_device, "vaapi");
    }

    #[tokio::test]
    async fn test_partial_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "workers": 3 }"#).await.unwrap();

        let loaded = Config::from_file(&config_path).await.unwrap();
        assert_eq!(loaded.workers, 3);
        assert_eq!(loaded.quality, 95);
    }

    #[tokio::test]
    async fn test_invalid_config_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "workers": 0 }"#).await.unwrap();

        assert!(Config::from_file(&config_path).await.is_err());
        assert!(Config::from_file(&temp_dir.path().join("missing.json")).await.is_err());
    }
}
