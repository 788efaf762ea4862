use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::ConfigError;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Git command failed: {0}")]
    CommandFailed(String),

    #[error("Nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("Execution resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Could not resolve repository working directory: {0}")]
    WorkingDirUnresolved(#[source] ConfigError),

    #[error("Git command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Not a git repository")]
    NotARepository,

    #[error("Git version {0} is too old. Minimum required: 2.13")]
    GitVersionTooOld(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl GitError {
    /// True for the benign "nothing to commit" outcome of a commit attempt
    pub fn is_nothing_to_commit(&self) -> bool {
        matches!(self, GitError::NothingToCommit)
    }
}

/// Top-level application error that wraps all module-specific errors
///
/// Used by the binary; library operations return [`GitError`] directly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
