use std::io;
use std::path::PathBuf;

use crate::artifact::LoaderFailure;
use crate::classifier::ClassifierError;
use crate::dataset::DatasetError;

/// Top-level failure taxonomy surfaced to the user by the CLI and the demo.
#[derive(Debug, thiserror::Error)]
pub enum SpamError {
    /// The dataset could not be read or parsed
    #[error("Failed to load dataset from {source_name}: {error}")]
    DatasetLoad {
        source_name: String,
        #[source]
        error: DatasetError,
    },
    /// No loader strategy could decode the model artifact
    #[error("Failed to load model artifact {path:?}: {}", format_attempts(.attempts))]
    LoadFailure {
        path: PathBuf,
        attempts: Vec<LoaderFailure>,
    },
    /// The extractor or the classifier rejected the training data
    #[error("Fit failure: {0}")]
    FitFailure(#[from] ClassifierError),
    /// The artifact decoded but is not a usable vectorizer/model pair
    #[error("Incompatible model bundle: {0}")]
    IncompatibleBundle(String),
    /// An input or output path was not readable or writable
    #[error("I/O failure on {path:?}: {error}")]
    IoFailure {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SpamError {
    pub(crate) fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            error,
        }
    }
}

fn format_attempts(attempts: &[LoaderFailure]) -> String {
    if attempts.is_empty() {
        return "no loader strategies configured".to_string();
    }
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, SpamError>;
