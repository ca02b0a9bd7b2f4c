//! # Library Backend
//!
//! Conversione in-process con il crate `image`: decode del PNG, encode WebP con
//! libwebp (feature `webp-encoder`).
//!
//! ## Pipeline:
//! 1. `image::open` del sorgente (PNG corrotti → `ImageError`)
//! 2. Conversione a RGB8 o RGBA8 a seconda della presenza del canale alpha
//!    (grayscale, palette e 16 bit vengono normalizzati qui)
//! 3. Encode WebP: lossless se `config.lossless`, altrimenti lossy a `config.quality`
//! 4. Scrittura su file temporaneo nella directory di output e `persist` atomico
//!
//! Il lavoro CPU-bound gira su `spawn_blocking` per non occupare i worker async.

use super::{success_message, EncoderBackend};
use crate::config::BackendConfig;
use crate::error::ConvertError;
use crate::file_manager::FileManager;
use crate::job::{ConversionJob, ConversionOutcome};
use async_trait::async_trait;
use image::codecs::webp::{WebPEncoder, WebPQuality};
use image::ColorType;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// In-process encoder backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryBackend;

impl LibraryBackend {
    pub fn new() -> Self {
        Self
    }

    /// Decode `source` and write it to `output` as WebP. Blocking.
    ///
    /// Returns the size in bytes of the written file.
    #[allow(deprecated)]
    pub fn encode_file(source: &Path, output: &Path, config: &BackendConfig) -> Result<u64, ConvertError> {
        let img = image::open(source)?;

        let (pixels, width, height, color) = if img.color().has_alpha() {
            let rgba = img.into_rgba8();
            let (width, height) = rgba.dimensions();
            (rgba.into_raw(), width, height, ColorType::Rgba8)
        } else {
            let rgb = img.into_rgb8();
            let (width, height) = rgb.dimensions();
            (rgb.into_raw(), width, height, ColorType::Rgb8)
        };

        // Lossless ignores the quality setting entirely
        let quality = if config.lossless {
            WebPQuality::lossless()
        } else {
            WebPQuality::lossy(config.quality)
        };

        let output_dir = output
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp_file = NamedTempFile::new_in(output_dir)?;

        {
            let mut writer = BufWriter::new(temp_file.as_file());
            WebPEncoder::new_with_quality(&mut writer, quality).encode(&pixels, width, height, color)?;
            writer.flush()?;
        }

        temp_file.persist(output).map_err(|e| ConvertError::Io(e.error))?;

        Ok(std::fs::metadata(output)?.len())
    }
}

#[async_trait]
impl EncoderBackend for LibraryBackend {
    fn name(&self) -> &'static str {
        "library"
    }

    async fn convert(&self, job: &ConversionJob, config: &BackendConfig) -> ConversionOutcome {
        let source = job.source_path().to_path_buf();
        let output = job.output_path().to_path_buf();
        let task_config = config.clone();

        let start_time = std::time::Instant::now();
        let result = tokio::task::spawn_blocking(move || Self::encode_file(&source, &output, &task_config)).await;

        match result {
            Ok(Ok(size)) => {
                debug!(
                    "Encoded {} ({}) in {:?}",
                    job.output_path().display(),
                    FileManager::format_size(size),
                    start_time.elapsed()
                );
                ConversionOutcome::succeeded(job.clone(), success_message(job, config))
            }
            Ok(Err(e)) => {
                warn!("Library conversion failed for {}: {}", job.source_path().display(), e);
                ConversionOutcome::failed(job.clone(), e)
            }
            Err(e) => {
                warn!("Encoder task for {} did not complete: {}", job.source_path().display(), e);
                ConversionOutcome::failed(job.clone(), format!("encoder task aborted: {}", e))
            }
        }
    }
}
