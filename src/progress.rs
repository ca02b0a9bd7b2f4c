//! # Progress Reporting Module
//!
//! Questo modulo gestisce la progress bar del batch.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Stampa di una riga per ogni file completato, sopra la barra
//! - Messaggio finale con il riepilogo
//!
//! ## Visual feedback:
//! ```text
//! Converted (quality 95): photo.png -> photo.webp
//! ⠋ [00:00:12] [=========================>--------------] 30/48 (62%) photo.png
//! ```
//!
//! Quando stderr non è un terminale la barra è nascosta, ma le righe per file vengono
//! comunque stampate su stdout.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Manages progress reporting for a conversion batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing (JSON mode, tests)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Print a line for a completed file and advance the bar
    pub fn file_done(&self, line: &str, file_name: &str) {
        // A closed stdout (e.g. piped into `head`) must not take the worker down
        self.bar.suspend(|| {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        });
        self.bar.inc(1);
        self.bar.set_message(file_name.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Current position, for tests and diagnostics
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}
