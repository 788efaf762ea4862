use std::env;
use std::path::{Path, PathBuf};

use crate::error::{GitError, GitResult};
use crate::git::branch::BranchOps;
use crate::git::commit::CommitOps;
use crate::git::executor::{ExecOptions, GitRunner};
use crate::git::remote::RemoteOps;
use crate::git::status::StatusService;

/// A git repository and the operations available on it
///
/// Holds no repository state of its own; every call reads the live tree.
#[derive(Debug)]
pub struct Repository {
    runner: GitRunner,
    options: ExecOptions,
}

impl Repository {
    /// Wrap a runner whose settings already resolve the repository root
    pub fn new(runner: GitRunner) -> Self {
        Self {
            runner,
            options: ExecOptions::default(),
        }
    }

    /// Open a repository at a known path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(GitRunner::for_repo(path))
    }

    /// Detect git repository from current working directory
    pub fn discover() -> GitResult<Self> {
        let current_dir = env::current_dir()?;
        Self::discover_from(current_dir)
    }

    /// Detect git repository starting from a specific directory
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        Ok(Self::open(find_root(start_path.as_ref())?))
    }

    /// Use these options (working directory, timeout) for every call
    pub fn with_options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    /// The directory commands run in
    pub fn path(&self) -> GitResult<PathBuf> {
        self.runner.working_dir(&self.options)
    }

    pub fn runner(&self) -> &GitRunner {
        &self.runner
    }

    pub fn branches(&self) -> BranchOps<'_> {
        BranchOps::new(&self.runner, &self.options)
    }

    pub fn remotes(&self) -> RemoteOps<'_> {
        RemoteOps::new(&self.runner, &self.options)
    }

    pub fn commits(&self) -> CommitOps<'_> {
        CommitOps::new(&self.runner, &self.options)
    }

    pub fn status(&self) -> StatusService<'_> {
        StatusService::new(&self.runner, &self.options)
    }
}

/// Walk up from `start` to the first directory holding `.git`
pub fn find_root(start: &Path) -> GitResult<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        // `.git` is a file inside linked worktrees
        if current.join(".git").exists() {
            return Ok(current);
        }

        if !current.pop() {
            return Err(GitError::NotARepository);
        }
    }
}
