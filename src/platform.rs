//! # Platform-specific utilities
//!
//! Questo modulo centralizza la gestione cross-platform dell'encoder esterno:
//! nome dell'eseguibile per piattaforma e verifica della disponibilità prima
//! di avviare un batch con il backend `process`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Platform-specific command manager
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let mut commands = HashMap::new();
        let which_command = if cfg!(windows) {
            commands.insert("ffmpeg", "ffmpeg.exe");
            "where"
        } else {
            commands.insert("ffmpeg", "ffmpeg");
            "which"
        };

        Self {
            commands,
            which_command,
        }
    }

    /// Get the platform-specific command name
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        self.commands.get(base_name).copied().unwrap_or(base_name)
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &str {
        self.which_command
    }

    /// Resolve the configured encoder to something `Command::new` can run.
    ///
    /// Bare names go through the platform table; anything with a directory part is used as-is.
    pub fn resolve_encoder(&self, encoder: &Path) -> PathBuf {
        if Self::is_bare_name(encoder) {
            let name = encoder.to_string_lossy();
            PathBuf::from(self.get_command(&name))
        } else {
            encoder.to_path_buf()
        }
    }

    /// Check if a command is available on the system PATH
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);

        let result = tokio::process::Command::new(self.which_command)
            .arg(command_name)
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("Failed to run {} {}: {}", self.which_command, command_name, e);
                false
            }
        }
    }

    /// Check that the configured encoder can be launched
    pub async fn is_encoder_available(&self, encoder: &Path) -> bool {
        if Self::is_bare_name(encoder) {
            self.is_command_available(&encoder.to_string_lossy()).await
        } else {
            encoder.is_file()
        }
    }

    fn is_bare_name(path: &Path) -> bool {
        path.components().count() == 1 && path.parent().map_or(true, |p| p.as_os_str().is_empty())
    }
}
