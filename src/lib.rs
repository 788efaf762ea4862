pub mod audit;
pub mod config;
pub mod error;
pub mod git;

// Re-export commonly used types for convenience
pub use error::{GitError, GitResult};
pub use git::{GitRunner, GitVersion, Repository, RepositoryStatus};
