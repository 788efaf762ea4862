pub mod branch;
pub mod commit;
pub mod executor;
pub mod parser;
pub mod process;
pub mod remote;
pub mod repository;
pub mod status;
pub mod types;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use branch::BranchOps;
pub use commit::CommitOps;
pub use executor::{quote_args, split_command_line, CommandResult, ExecOptions, GitRunner};
pub use process::{ExecPool, Spawner, TokioSpawner};
pub use remote::RemoteOps;
pub use repository::Repository;
pub use status::StatusService;
pub use types::{
    Branch, BranchList, ChangeCounts, ChangeKind, Commit, CommitId, FileChange, Remote,
    RemoteDirection, RepositoryStatus,
};
pub use version::GitVersion;
