use tracing::warn;

use crate::error::{GitError, GitResult};
use crate::git::branch::BranchOps;
use crate::git::commit::CommitOps;
use crate::git::executor::{ExecOptions, GitRunner};
use crate::git::parser;
use crate::git::types::{ChangeCounts, RepositoryStatus};

/// Assembles [`RepositoryStatus`] from live repository state
#[derive(Debug, Clone, Copy)]
pub struct StatusService<'a> {
    runner: &'a GitRunner,
    options: &'a ExecOptions,
}

impl<'a> StatusService<'a> {
    pub fn new(runner: &'a GitRunner, options: &'a ExecOptions) -> Self {
        Self { runner, options }
    }

    /// Working tree status only, without ahead/behind or the last commit
    pub async fn get_status(&self) -> GitResult<RepositoryStatus> {
        let output = self
            .runner
            .execute(&["status", "--porcelain=v2", "--branch", "-z"], self.options)
            .await?
            .check("Reading status")?;

        Ok(parser::parse_status_porcelain_v2(&output.stdout))
    }

    /// Status plus ahead/behind counts and the last commit
    ///
    /// Ahead/behind falls back to (0, 0) when the branch has no upstream or
    /// the comparison fails for any other reason.
    pub async fn get_full_status(&self) -> GitResult<RepositoryStatus> {
        let mut status = self.get_status().await?;

        let (ahead, behind) = match self.ahead_behind().await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(error = %e, "ahead/behind unavailable, reporting 0/0");
                (0, 0)
            }
        };
        status.ahead = ahead;
        status.behind = behind;

        // An unborn branch has no commit to describe
        if status.head_oid.is_some() {
            let commits = CommitOps::new(self.runner, self.options);
            status.last_commit = Some(commits.last_commit().await?);
        }

        Ok(status)
    }

    /// Commits the current branch is ahead of and behind its upstream
    pub async fn ahead_behind(&self) -> GitResult<(usize, usize)> {
        let branch = BranchOps::new(self.runner, self.options).current().await?;
        let range = format!("{0}...{0}@{{upstream}}", branch);

        let output = self
            .runner
            .execute(&["rev-list", "--left-right", "--count", &range], self.options)
            .await?
            .check("Comparing with upstream")?;

        parser::parse_ahead_behind(&output.stdout).ok_or_else(|| {
            GitError::ParseError(format!(
                "unexpected rev-list count output: {}",
                output.stdout.trim()
            ))
        })
    }

    pub async fn count_changes(&self) -> GitResult<ChangeCounts> {
        Ok(self.get_full_status().await?.counts())
    }

    pub async fn is_clean(&self) -> GitResult<bool> {
        Ok(self.get_full_status().await?.is_clean)
    }
}
