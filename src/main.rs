//! # PNG to WebP Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Costruzione della configurazione (file JSON opzionale + override da CLI)
//! - Avvio del `BatchConverter`
//!
//! ## Exit code:
//! - `0`: il batch è stato eseguito, anche se alcuni file sono falliti
//! - `1`: errore di setup (directory mancante, parametri non validi, ffmpeg assente)
//!
//! ## Esempio di utilizzo:
//! ```bash
//! png2webp ./screenshots -o ./webp -q 80 -t 8
//! png2webp ./sprites --lossless --backend process --hwaccel
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use png_webp_converter::config::{validate_quality, validate_workers};
use png_webp_converter::json_output::JsonMessage;
use png_webp_converter::{BackendKind, BatchConverter, Config};

#[derive(Parser)]
#[command(name = "png2webp")]
#[command(about = "Convert PNG files to WebP format")]
struct Args {
    /// Directory containing PNG files to convert
    input_directory: PathBuf,

    /// Output directory (default: same as input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// WebP quality 0-100 (default: 95)
    #[arg(short, long, allow_negative_numbers = true)]
    quality: Option<i64>,

    /// Use lossless compression (ignores quality setting)
    #[arg(short, long)]
    lossless: bool,

    /// Number of parallel workers (default: 1 = sequential)
    #[arg(short, long, allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Encoder backend (default: library)
    #[arg(short, long, value_enum)]
    backend: Option<BackendKind>,

    /// Ask ffmpeg for hardware-accelerated decode (process backend only)
    #[arg(long)]
    hwaccel: bool,

    /// Device passed to ffmpeg's -hwaccel option (default: cuda)
    #[arg(long)]
    hwaccel_device: Option<String>,

    /// External encoder executable (default: ffmpeg)
    #[arg(long)]
    encoder: Option<PathBuf>,

    /// Convert only the first file when several map to the same output
    #[arg(long)]
    dedup_outputs: bool,

    /// Load settings from a JSON config file; command line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output progress as JSON lines for programmatic use
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for per-file lines and JSON
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let json_output = args.json;
    let result = run(args).await;

    if let Err(ref e) = result {
        if json_output {
            JsonMessage::error(format!("{:#}", e)).emit();
        }
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let config = build_config(&args).await?;
    let converter = BatchConverter::new(&args.input_directory, config)?;
    converter.run().await?;
    Ok(())
}

/// Layer command line flags over the config file (or the defaults)
async fn build_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        // Validated once merged, in BatchConverter::new
        Some(ref path) => Config::read_file(path).await?,
        None => Config::default(),
    };

    if let Some(quality) = args.quality {
        config.quality = validate_quality(quality)?;
    }
    if let Some(threads) = args.threads {
        config.workers = validate_workers(threads)?;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(ref device) = args.hwaccel_device {
        config.hwaccel_device = device.clone();
    }
    if let Some(ref encoder) = args.encoder {
        config.encoder_binary = encoder.clone();
    }
    if let Some(ref output) = args.output {
        config.output_path = Some(output.clone());
    }

    config.lossless |= args.lossless;
    config.use_hardware_accel |= args.hwaccel;
    config.dedup_outputs |= args.dedup_outputs;
    config.json_output |= args.json;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[tokio::test]
    async fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "png2webp", "in", "-q", "70", "-t", "4", "-l", "--backend", "process", "--hwaccel", "-o", "out",
        ]);
        let config = build_config(&args).await.unwrap();

        assert_eq!(config.quality, 70);
        assert_eq!(config.workers, 4);
        assert!(config.lossless);
        assert_eq!(config.backend, BackendKind::Process);
        assert!(config.use_hardware_accel);
        assert_eq!(config.hwaccel_device, "cuda");
        assert_eq!(config.output_path, Some(PathBuf::from("out")));
    }

    #[tokio::test]
    async fn test_defaults_without_flags() {
        let args = Args::parse_from(["png2webp", "in"]);
        let config = build_config(&args).await.unwrap();

        assert_eq!(config.quality, 95);
        assert_eq!(config.workers, 1);
        assert!(!config.lossless);
        assert_eq!(config.backend, BackendKind::Library);
        assert_eq!(config.output_path, None);
    }

    #[tokio::test]
    async fn test_out_of_range_flags_rejected() {
        for argv in [
            vec!["png2webp", "in", "-q", "-1"],
            vec!["png2webp", "in", "-q", "101"],
            vec!["png2webp", "in", "-t", "0"],
        ] {
            let args = Args::parse_from(argv.clone());
            assert!(build_config(&args).await.is_err(), "{:?}", argv);
        }
    }

    #[tokio::test]
    async fn test_config_file_is_overridden_by_flags() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("png2webp.json");
        std::fs::write(&path, r#"{"quality": 40, "workers": 3}"#).unwrap();

        let args = Args::parse_from(["png2webp", "in", "--config", path.to_str().unwrap(), "-q", "55"]);
        let config = build_config(&args).await.unwrap();

        assert_eq!(config.quality, 55);
        assert_eq!(config.workers, 3);
    }

    #[tokio::test]
    async fn test_flags_can_repair_config_file_values() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("png2webp.json");
        std::fs::write(&path, r#"{"workers": 0, "use_hardware_accel": true}"#).unwrap();
        let path = path.to_str().unwrap();

        let args = Args::parse_from(["png2webp", "in", "--config", path]);
        let config = build_config(&args).await.unwrap();
        assert!(BatchConverter::new(&args.input_directory, config).is_err());

        let args = Args::parse_from(["png2webp", "in", "--config", path, "-t", "4", "--backend", "process"]);
        let config = build_config(&args).await.unwrap();
        assert_eq!(config.workers, 4);
        assert!(BatchConverter::new(&args.input_directory, config).is_ok());
    }
}
