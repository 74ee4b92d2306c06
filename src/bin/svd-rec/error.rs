//! Error types for svd-rec

use std::process::ExitCode;
use svd_recommender::config::ConfigError;
use svd_recommender::RecommendError;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Lookup or model load failure
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    /// Bad config file or flags
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing results failed
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed
    #[error("output error: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::Recommend(RecommendError::UnknownIdentifier { .. }) => ExitCode::from(2),
            Self::Recommend(RecommendError::InvalidTopN { .. }) => ExitCode::from(3),
            Self::Recommend(RecommendError::ModelStoreUnavailable(_)) => ExitCode::from(4),
            Self::Config(_) => ExitCode::from(5),
            Self::Io(_) | Self::Render(_) => ExitCode::from(6),
        }
    }
}
