//! CLI errors.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Model(#[from] dbmodel_core::Error),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        CliError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Render the error for the terminal. Model errors get a source snippet
    /// when the DSL text is available.
    pub fn report(&self, source: Option<&str>) -> String {
        match (self, source) {
            (CliError::Model(e), Some(text)) => e.format_with_source(text),
            _ => format!("Error: {}", self),
        }
    }
}
