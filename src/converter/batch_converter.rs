//! # Batch Converter Main Orchestrator
//!
//! Orchestratore principale che delega responsabilità ai moduli specializzati.
//!
//! ## Flusso:
//! 1. Validazione configurazione (nessun effetto sul filesystem)
//! 2. Controllo directory di input e dipendenze (ffmpeg per il backend `process`)
//! 3. Creazione directory di output
//! 4. Enumerazione dei job (ed eventuale deduplicazione)
//! 5. Esecuzione nel worker pool
//! 6. Riepilogo `succeeded/total`
//!
//! Gli errori dei punti 1-4 interrompono l'esecuzione; i fallimenti dei singoli file
//! vengono solo contati nel riepilogo.

use crate::{
    backend::{create_backend, EncoderBackend},
    config::{BackendKind, Config},
    converter::{
        path_resolver::PathResolver,
        result_aggregator::{Reporter, ResultAggregator},
        worker_pool::WorkerPool,
    },
    error::ConvertError,
    file_manager::FileManager,
    json_output::{JsonConfig, JsonMessage},
    platform::PlatformCommands,
    progress::ProgressManager,
};
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Final report of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSummary {
    pub succeeded: usize,
    pub total: usize,
    pub duration_seconds: f64,
    /// Per-file messages in the order they were recorded
    pub messages: Vec<String>,
}

impl ConversionSummary {
    fn empty(duration_seconds: f64) -> Self {
        Self {
            succeeded: 0,
            total: 0,
            duration_seconds,
            messages: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Human-readable summary line
    pub fn format_summary(&self) -> String {
        format!(
            "Conversion complete! {}/{} files converted successfully.",
            self.succeeded, self.total
        )
    }
}

/// Converts every PNG of one directory into WebP
pub struct BatchConverter {
    config: Config,
    input_dir: PathBuf,
}

impl BatchConverter {
    /// Create a converter for `input_dir`. Rejects invalid configuration before any I/O.
    pub fn new(input_dir: &Path, config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            input_dir: input_dir.to_path_buf(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the batch with the backend selected in the configuration
    pub async fn run(&self) -> Result<ConversionSummary> {
        self.check_dependencies().await?;
        let backend = create_backend(self.config.backend);
        self.run_with_backend(backend).await
    }

    /// Run the batch with an explicit backend
    pub async fn run_with_backend(&self, backend: Arc<dyn EncoderBackend>) -> Result<ConversionSummary> {
        let start_time = Instant::now();

        FileManager::check_input_dir(&self.input_dir)?;

        let output_dir = PathResolver::resolve_output_dir(&self.input_dir, self.config.output_path.as_deref());
        PathResolver::ensure_output_dir(&output_dir).await?;

        let mut jobs = FileManager::enumerate_jobs(&self.input_dir, &output_dir)?;
        if self.config.dedup_outputs {
            jobs = FileManager::dedup_by_output(jobs);
        }

        if jobs.is_empty() {
            info!("No PNG files found in '{}'", self.input_dir.display());
            let summary = ConversionSummary::empty(start_time.elapsed().as_secs_f64());
            self.report_summary(&summary);
            return Ok(summary);
        }

        self.emit_start_message(&output_dir, jobs.len());
        self.log_configuration(&output_dir, jobs.len(), backend.as_ref());

        let reporter = if self.config.json_output {
            Reporter::Json
        } else {
            Reporter::Progress(ProgressManager::new(jobs.len() as u64))
        };
        let aggregator = ResultAggregator::new(reporter);

        let pool = WorkerPool::new(backend, self.config.backend_config(), self.config.workers)?;
        let result = pool.run(jobs, &aggregator).await;

        let summary = ConversionSummary {
            succeeded: result.succeeded,
            total: result.total,
            duration_seconds: start_time.elapsed().as_secs_f64(),
            messages: result.ordered_messages,
        };

        aggregator.finish(&summary.format_summary());
        self.report_summary(&summary);

        Ok(summary)
    }

    /// Check that the external encoder can be launched
    async fn check_dependencies(&self) -> Result<()> {
        if self.config.backend != BackendKind::Process {
            return Ok(());
        }

        let encoder = &self.config.encoder_binary;
        if !PlatformCommands::instance().is_encoder_available(encoder).await {
            return Err(ConvertError::MissingDependency(format!(
                "{} is required for the process backend. Please install ffmpeg or pass --encoder.",
                encoder.display()
            ))
            .into());
        }

        debug!("Encoder {} is available", encoder.display());
        Ok(())
    }

    fn emit_start_message(&self, output_dir: &Path, total_files: usize) {
        if self.config.json_output {
            JsonMessage::start(
                self.input_dir.clone(),
                output_dir.to_path_buf(),
                total_files,
                JsonConfig::from(&self.config),
            )
            .emit();
        } else {
            info!("Starting conversion in: {}", self.input_dir.display());
        }
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(&self, output_dir: &Path, total_files: usize, backend: &dyn EncoderBackend) {
        if self.config.json_output {
            return;
        }

        if self.config.lossless {
            info!("Mode: lossless");
        } else {
            info!("Mode: lossy (quality: {})", self.config.quality);
        }
        info!("Output directory: {}", output_dir.display());
        info!("Backend: {} with {} worker(s)", backend.name(), self.config.workers);
        if self.config.use_hardware_accel {
            info!("Hardware decode hint: {}", self.config.hwaccel_device);
        }
        info!("Found {} PNG files to convert", total_files);
    }

    fn report_summary(&self, summary: &ConversionSummary) {
        if self.config.json_output {
            JsonMessage::complete(summary.succeeded, summary.total, summary.duration_seconds).emit();
        } else {
            let _ = writeln!(std::io::stdout().lock(), "\n{}", summary.format_summary());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::job::{ConversionJob, ConversionOutcome};
    use async_trait::async_trait;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EncoderBackend for CountingBackend {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn convert(&self, job: &ConversionJob, _config: &BackendConfig) -> ConversionOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ConversionOutcome::succeeded(job.clone(), job.source_name())
        }
    }

    fn write_png(dir: &Path, name: &str, seed: u8) {
        RgbImage::from_fn(12, 9, |x, y| Rgb([seed, x as u8 * 20, y as u8 * 25]))
            .save(dir.join(name))
            .unwrap();
    }

    fn populate(dir: &Path) {
        write_png(dir, "a.png", 10);
        write_png(dir, "b.png", 90);
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 128]))
            .save(dir.join("c.png"))
            .unwrap();
        std::fs::write(dir.join("broken.png"), b"definitely not a png").unwrap();
        std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_directory_counts_failures() {
        let input = TempDir::new().unwrap();
        populate(input.path());
        let output = input.path().join("webp");

        let config = Config {
            workers: 3,
            output_path: Some(output.clone()),
            ..Default::default()
        };
        let summary = BatchConverter::new(input.path(), config).unwrap().run().await.unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.format_summary(), "Conversion complete! 3/4 files converted successfully.");

        for name in ["a.webp", "b.webp", "c.webp"] {
            assert!(output.join(name).is_file(), "{} missing", name);
        }
        assert!(!output.join("broken.webp").exists());
        assert!(!output.join("notes.webp").exists());
        assert!(summary.messages.iter().any(|m| m.starts_with("✗ Error converting broken.png")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_fails_only_itself() {
        let input = TempDir::new().unwrap();
        write_png(input.path(), "good.png", 7);
        std::os::unix::fs::symlink(input.path().join("gone.png"), input.path().join("link.png")).unwrap();

        let summary = BatchConverter::new(input.path(), Config::default())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!((summary.succeeded, summary.total), (1, 2));
        assert!(input.path().join("good.webp").is_file());
        assert!(summary.messages.iter().any(|m| m.starts_with("✗ Error converting link.png")));
    }

    #[tokio::test]
    async fn test_rerun_gives_same_result() {
        let input = TempDir::new().unwrap();
        populate(input.path());
        let output = TempDir::new().unwrap();

        let config = Config {
            workers: 2,
            output_path: Some(output.path().to_path_buf()),
            ..Default::default()
        };
        let converter = BatchConverter::new(input.path(), config).unwrap();

        let first = converter.run().await.unwrap();
        let second = converter.run().await.unwrap();

        assert_eq!((first.succeeded, first.total), (second.succeeded, second.total));
        assert!(output.path().join("a.webp").is_file());
    }

    #[tokio::test]
    async fn test_default_output_is_input_directory() {
        let input = TempDir::new().unwrap();
        write_png(input.path(), "only.png", 1);

        let summary = BatchConverter::new(input.path(), Config::default())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!((summary.succeeded, summary.total), (1, 1));
        assert!(input.path().join("only.webp").is_file());
        assert!(input.path().join("only.png").is_file());
    }

    #[tokio::test]
    async fn test_nested_output_directory_is_created() {
        let input = TempDir::new().unwrap();
        write_png(input.path(), "a.png", 1);
        let output = input.path().join("deep").join("er").join("out");

        let config = Config {
            output_path: Some(output.clone()),
            ..Default::default()
        };
        BatchConverter::new(input.path(), config).unwrap().run().await.unwrap();

        assert!(output.join("a.webp").is_file());
    }

    #[tokio::test]
    async fn test_empty_directory_invokes_no_backend() {
        let input = TempDir::new().unwrap();
        std::fs::write(input.path().join("readme.md"), b"no images").unwrap();
        let backend = Arc::new(CountingBackend::default());

        let summary = BatchConverter::new(input.path(), Config::default())
            .unwrap()
            .run_with_backend(backend.clone())
            .await
            .unwrap();

        assert_eq!((summary.succeeded, summary.total), (0, 0));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sequential_run_follows_file_name_order() {
        let input = TempDir::new().unwrap();
        for name in ["delta.png", "alpha.png", "charlie.png", "bravo.png"] {
            std::fs::write(input.path().join(name), b"x").unwrap();
        }
        let backend = Arc::new(CountingBackend::default());

        let summary = BatchConverter::new(input.path(), Config::default())
            .unwrap()
            .run_with_backend(backend)
            .await
            .unwrap();

        assert_eq!(summary.messages, vec!["alpha.png", "bravo.png", "charlie.png", "delta.png"]);
    }

    #[tokio::test]
    async fn test_invalid_config_touches_nothing() {
        let input = TempDir::new().unwrap();
        write_png(input.path(), "a.png", 1);
        let output = input.path().join("never");

        for config in [
            Config {
                workers: 0,
                output_path: Some(output.clone()),
                ..Default::default()
            },
            Config {
                quality: 101,
                output_path: Some(output.clone()),
                ..Default::default()
            },
        ] {
            assert!(BatchConverter::new(input.path(), config).is_err());
        }
        assert!(!output.exists());
        assert!(!input.path().join("a.webp").exists());
    }

    #[tokio::test]
    async fn test_missing_input_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let output = temp_dir.path().join("out");

        let config = Config {
            output_path: Some(output.clone()),
            ..Default::default()
        };
        let err = BatchConverter::new(&missing, config).unwrap().run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::DirectoryNotFound(_))
        ));
        assert!(err.to_string().contains("does not exist"));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_encoder_fails_before_output_is_created() {
        let input = TempDir::new().unwrap();
        write_png(input.path(), "a.png", 1);
        let output = input.path().join("out");

        let config = Config {
            backend: BackendKind::Process,
            encoder_binary: PathBuf::from("/nonexistent/bin/ffmpeg"),
            output_path: Some(output.clone()),
            ..Default::default()
        };
        let err = BatchConverter::new(input.path(), config).unwrap().run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::MissingDependency(_))
        ));
        assert!(!output.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dedup_outputs_keeps_first_job() {
        let input = TempDir::new().unwrap();
        std::fs::write(input.path().join("a.PNG"), b"x").unwrap();
        std::fs::write(input.path().join("a.png"), b"x").unwrap();
        std::fs::write(input.path().join("b.png"), b"x").unwrap();

        let without = BatchConverter::new(input.path(), Config::default())
            .unwrap()
            .run_with_backend(Arc::new(CountingBackend::default()))
            .await
            .unwrap();
        assert_eq!(without.total, 3);

        let config = Config {
            dedup_outputs: true,
            ..Default::default()
        };
        let with = BatchConverter::new(input.path(), config)
            .unwrap()
            .run_with_backend(Arc::new(CountingBackend::default()))
            .await
            .unwrap();
        assert_eq!(with.total, 2);
        assert_eq!(with.messages, vec!["a.PNG", "b.png"]);
    }
}
