use tracing::info;

use crate::error::{GitError, GitResult};
use crate::git::executor::{require_arg, CommandResult, ExecOptions, GitRunner};
use crate::git::parser;
use crate::git::types::{Commit, CommitId};

/// `%H` hash, `%an` author, `%ad` date, `%s` subject; one per line
const LAST_COMMIT_FORMAT: &str = "--format=%H%n%an%n%ad%n%s";

/// Index and history operations
#[derive(Debug, Clone, Copy)]
pub struct CommitOps<'a> {
    runner: &'a GitRunner,
    options: &'a ExecOptions,
}

impl<'a> CommitOps<'a> {
    pub fn new(runner: &'a GitRunner, options: &'a ExecOptions) -> Self {
        Self { runner, options }
    }

    pub async fn stage(&self, file: &str) -> GitResult<()> {
        let file = require_arg("file", file)?;

        self.runner
            .execute(&["add", "--", file], self.options)
            .await?
            .check(&format!("Staging '{}'", file))?;
        Ok(())
    }

    pub async fn stage_all(&self) -> GitResult<()> {
        self.runner
            .execute(&["add", "-A"], self.options)
            .await?
            .check("Staging all changes")?;
        Ok(())
    }

    pub async fn unstage(&self, file: &str) -> GitResult<()> {
        let file = require_arg("file", file)?;

        self.runner
            .execute(&["reset", "-q", "HEAD", "--", file], self.options)
            .await?
            .check(&format!("Unstaging '{}'", file))?;
        Ok(())
    }

    /// Record the index as a new commit
    ///
    /// Returns [`GitError::NothingToCommit`] when nothing was staged, and
    /// [`CommitId::unknown`] if git's summary line could not be read.
    pub async fn commit(&self, message: &str, author: Option<&str>) -> GitResult<CommitId> {
        let message = require_arg("commit message", message)?;

        let mut args = vec!["commit".to_string(), "-m".to_string(), message.to_string()];
        if let Some(author) = author {
            let author = require_arg("author", author)?;
            args.push(format!("--author={}", author));
        }

        let result = self.runner.execute(&args, self.options).await?;
        let id = commit_outcome(result, "Commit")?;

        info!(commit = %id, "created commit");
        Ok(id)
    }

    /// Rewrite the last commit, keeping its message unless one is given
    pub async fn amend(&self, message: Option<&str>) -> GitResult<CommitId> {
        let mut args = vec!["commit", "--amend"];
        match message {
            Some(message) => {
                args.push("-m");
                args.push(require_arg("commit message", message)?);
            }
            None => args.push("--no-edit"),
        }

        let result = self.runner.execute(&args, self.options).await?;
        let id = commit_outcome(result, "Amend")?;

        info!(commit = %id, "amended commit");
        Ok(id)
    }

    /// Most recent commits first; an unborn branch has no history
    pub async fn history(&self, count: Option<usize>) -> GitResult<Vec<Commit>> {
        let mut args = vec![
            "log".to_string(),
            "--no-color".to_string(),
            "--decorate=no".to_string(),
            "--pretty=medium".to_string(),
        ];
        if let Some(count) = count {
            if count == 0 {
                return Err(GitError::InvalidArgument(
                    "history count must be greater than 0".to_string(),
                ));
            }
            args.push(format!("-n{}", count));
        }

        let result = self.runner.execute(&args, self.options).await?;
        if !result.success && result.stderr.contains("does not have any commits") {
            return Ok(Vec::new());
        }
        let output = result.check("Reading history")?;

        Ok(parser::parse_log(&output.stdout))
    }

    /// Metadata of the commit at HEAD
    pub async fn last_commit(&self) -> GitResult<Commit> {
        let output = self
            .runner
            .execute(&["log", "-1", LAST_COMMIT_FORMAT], self.options)
            .await?
            .check("Reading last commit")?;

        parser::parse_last_commit(&output.stdout)
    }
}

fn commit_outcome(result: CommandResult, action: &str) -> GitResult<CommitId> {
    // git reports this on stdout; older versions used stderr
    if !result.success
        && (parser::is_nothing_to_commit(&result.stdout)
            || parser::is_nothing_to_commit(&result.stderr))
    {
        return Err(GitError::NothingToCommit);
    }

    let output = result.check(action)?;
    Ok(parser::extract_commit_id(&output.stdout))
}
