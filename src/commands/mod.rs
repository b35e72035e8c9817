//! Presentation-layer command handlers used by the CLI.
//!
//! Handlers return user-facing messages as `Err(String)`; the binary only
//! prints them.

pub mod analyze;
pub mod history;

use std::path::PathBuf;

use crate::config::{self, AnalyzerConfig};
use crate::history::{FileStorage, HistoryStore, KeyValueStorage, MemoryStorage};
use crate::pipeline::analysis::{AnalysisError, SymptomAnalyzer};

/// Where history is kept for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLocation {
    /// Files under the given directory.
    Directory(PathBuf),
    /// In memory only; discarded on exit.
    Ephemeral,
}

impl HistoryLocation {
    /// Default on-disk location unless overridden.
    pub fn resolve(data_dir: Option<PathBuf>, ephemeral: bool) -> Self {
        if ephemeral {
            Self::Ephemeral
        } else {
            Self::Directory(data_dir.unwrap_or_else(config::storage_dir))
        }
    }
}

pub fn open_history(location: &HistoryLocation) -> HistoryStore {
    let storage: Box<dyn KeyValueStorage> = match location {
        HistoryLocation::Directory(dir) => Box::new(FileStorage::new(dir.clone())),
        HistoryLocation::Ephemeral => Box::new(MemoryStorage::new()),
    };
    HistoryStore::new(storage)
}

/// Build the analyzer used by `analyze`.
pub fn build_analyzer(
    config: &AnalyzerConfig,
    location: &HistoryLocation,
) -> Result<SymptomAnalyzer, String> {
    SymptomAnalyzer::from_config(config, open_history(location)).map_err(|e| user_message(&e))
}

/// Message shown to the user for an analysis failure.
pub fn user_message(error: &AnalysisError) -> String {
    match error {
        AnalysisError::EmptyInput => {
            "Please describe your symptoms before requesting an analysis.".into()
        }
        AnalysisError::InputTooLong { len, max } => format!(
            "Your description is too long ({len} characters). Please keep it under {max} characters."
        ),
        AnalysisError::Configuration => format!(
            "The analysis service is not configured. Set {} to use it.",
            config::ENV_API_KEY
        ),
        AnalysisError::Transport {
            status: Some(status),
            ..
        } => format!(
            "The analysis service returned an error (HTTP {status}). Please try again later."
        ),
        AnalysisError::Transport { status: None, .. } => {
            "Could not reach the analysis service. Check your connection and try again.".into()
        }
        AnalysisError::ResponseFormat(_) => {
            "The analysis service sent an unexpected reply. Please try again.".into()
        }
        AnalysisError::Parse(_) => {
            "The analysis service's answer could not be understood. Please try again.".into()
        }
    }
}
