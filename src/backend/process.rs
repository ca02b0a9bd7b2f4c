//! # Process Backend
//!
//! Conversione tramite encoder esterno (ffmpeg con codec `libwebp`).
//!
//! ## Responsabilità:
//! - Costruzione della command line dell'encoder
//! - Hint di decode hardware (`-hwaccel <device>`) prima della selezione dell'input
//! - Esecuzione asincrona con `tokio::process::Command` e cattura di stderr
//!
//! ## Command line:
//! ```text
//! ffmpeg -y -hide_banner -loglevel error [-hwaccel cuda] -i file:in.png \
//!        -c:v libwebp (-lossless 1 | -quality 95) -compression_level 4 file:out.webp
//! ```
//!
//! I path passano sempre con il prefisso `file:`, così nomi come `-out` o `a:b.png`
//! non vengono letti da ffmpeg come opzioni o protocolli.
//!
//! Il successo dipende solo dall'exit status. L'accelerazione hardware è solo un
//! suggerimento per ffmpeg: nessuna verifica che sia stata davvero usata, nessun
//! coordinamento tra worker che la richiedono contemporaneamente.

use super::{success_message, EncoderBackend};
use crate::args;
use crate::config::BackendConfig;
use crate::error::ConvertError;
use crate::job::{ConversionJob, ConversionOutcome};
use crate::platform::PlatformCommands;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Fixed mid-level `libwebp` compression effort (0 = fastest, 6 = slowest)
pub const COMPRESSION_LEVEL: u8 = 4;

/// Encoder backend that shells out to ffmpeg
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessBackend;

impl ProcessBackend {
    pub fn new() -> Self {
        Self
    }

    /// Build the encoder arguments for a job
    pub fn build_args(job: &ConversionJob, config: &BackendConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = flags(args!["-y", "-hide_banner", "-loglevel", "error"]).collect();

        // Decode hint must precede the input it applies to
        if config.use_hardware_accel {
            args.extend(flags(args!["-hwaccel", config.hwaccel_device]));
        }

        args.push("-i".into());
        args.push(file_url(job.source_path()));
        args.extend(flags(args!["-c:v", "libwebp"]));

        if config.lossless {
            args.extend(flags(args!["-lossless", 1]));
        } else {
            args.extend(flags(args!["-quality", config.quality]));
        }

        args.extend(flags(args!["-compression_level", COMPRESSION_LEVEL]));
        args.push(file_url(job.output_path()));
        args
    }
}

/// Path as an explicit ffmpeg `file:` URL
fn file_url(path: &Path) -> OsString {
    let mut url = OsString::from("file:");
    url.push(path.as_os_str());
    url
}

fn flags(items: Vec<String>) -> impl Iterator<Item = OsString> {
    items.into_iter().map(OsString::from)
}

#[async_trait]
impl EncoderBackend for ProcessBackend {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn convert(&self, job: &ConversionJob, config: &BackendConfig) -> ConversionOutcome {
        let program = PlatformCommands::instance().resolve_encoder(&config.encoder_binary);
        let args = Self::build_args(job, config);
        debug!("Command arguments: {} {:?}", program.display(), args);

        let start_time = std::time::Instant::now();
        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await;
        let elapsed = start_time.elapsed();

        match output {
            Ok(output) if output.status.success() => {
                debug!("{} encoded {} in {:?}", program.display(), job.output_path().display(), elapsed);
                ConversionOutcome::succeeded(job.clone(), success_message(job, config))
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                warn!(
                    "{} failed for {} after {:?} ({})",
                    program.display(),
                    job.source_path().display(),
                    elapsed,
                    output.status
                );
                let error = ConvertError::Encoder(format!(
                    "{} exited with {}: {}",
                    program.display(),
                    output.status,
                    stderr
                ));
                ConversionOutcome::failed(job.clone(), error)
            }
            Err(e) => {
                warn!("Failed to execute {}: {}", program.display(), e);
                ConversionOutcome::failed(job.clone(), format!("failed to execute {}: {}", program.display(), e))
            }
        }
    }
}
