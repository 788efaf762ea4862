use tracing::info;

use crate::error::GitResult;
use crate::git::executor::{require_ref, ExecOptions, GitRunner};
use crate::git::parser;
use crate::git::types::BranchList;

/// Local branch operations
#[derive(Debug, Clone, Copy)]
pub struct BranchOps<'a> {
    runner: &'a GitRunner,
    options: &'a ExecOptions,
}

impl<'a> BranchOps<'a> {
    pub fn new(runner: &'a GitRunner, options: &'a ExecOptions) -> Self {
        Self { runner, options }
    }

    /// List local branches, marking the checked-out one
    pub async fn list(&self) -> GitResult<BranchList> {
        let output = self
            .runner
            .execute(&["branch", "--no-color"], self.options)
            .await?
            .check("Listing branches")?;

        Ok(parser::parse_branch_list(&output.stdout))
    }

    /// Name of the checked-out branch (`HEAD` when detached)
    pub async fn current(&self) -> GitResult<String> {
        let output = self
            .runner
            .execute(&["rev-parse", "--abbrev-ref", "HEAD"], self.options)
            .await?
            .check("Resolving current branch")?;

        Ok(output.stdout.trim().to_string())
    }

    pub async fn create(&self, name: &str) -> GitResult<()> {
        let name = require_ref("branch name", name)?;

        self.runner
            .execute(&["branch", name], self.options)
            .await?
            .check(&format!("Creating branch '{}'", name))?;

        info!(branch = name, "created branch");
        Ok(())
    }

    pub async fn create_and_switch(&self, name: &str) -> GitResult<()> {
        let name = require_ref("branch name", name)?;

        self.runner
            .execute(&["checkout", "-b", name], self.options)
            .await?
            .check(&format!("Creating and switching to branch '{}'", name))?;

        info!(branch = name, "created and switched to branch");
        Ok(())
    }

    pub async fn switch(&self, name: &str) -> GitResult<()> {
        let name = require_ref("branch name", name)?;

        self.runner
            .execute(&["checkout", name], self.options)
            .await?
            .check(&format!("Switching to branch '{}'", name))?;

        info!(branch = name, "switched branch");
        Ok(())
    }

    /// Delete a branch; `force` also drops unmerged work
    pub async fn delete(&self, name: &str, force: bool) -> GitResult<()> {
        let name = require_ref("branch name", name)?;
        let flag = if force { "-D" } else { "-d" };

        self.runner
            .execute(&["branch", flag, name], self.options)
            .await?
            .check(&format!("Deleting branch '{}'", name))?;

        info!(branch = name, force, "deleted branch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitError;
    use crate::git::testing::{Reply, ScriptedSpawner};
    use std::sync::Arc;

    fn runner_with(spawner: Arc<ScriptedSpawner>) -> GitRunner {
        GitRunner::for_repo("/repo").with_spawner(spawner)
    }

    #[tokio::test]
    async fn test_list_parses_output() {
        let spawner = Arc::new(ScriptedSpawner::new(|_| Reply::ok("  main\n* dev\n")));
        let runner = runner_with(spawner.clone());
        let options = ExecOptions::default();

        let branches = BranchOps::new(&runner, &options).list().await.unwrap();

        assert_eq!(branches.current.as_deref(), Some("dev"));
        assert_eq!(branches.list, vec!["main", "dev"]);
        assert_eq!(spawner.calls(), vec![vec!["branch", "--no-color"]]);
    }

    #[tokio::test]
    async fn test_empty_name_fails_before_spawn() {
        let spawner = Arc::new(ScriptedSpawner::new(|_| Reply::ok("")));
        let runner = runner_with(spawner.clone());
        let options = ExecOptions::default();
        let ops = BranchOps::new(&runner, &options);

        assert!(matches!(
            ops.create("").await,
            Err(GitError::InvalidArgument(_))
        ));
        assert!(matches!(
            ops.switch("   ").await,
            Err(GitError::InvalidArgument(_))
        ));
        assert!(matches!(
            ops.delete("-x", true).await,
            Err(GitError::InvalidArgument(_))
        ));
        assert!(spawner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_argument_vectors() {
        let spawner = Arc::new(ScriptedSpawner::new(|_| Reply::ok("")));
        let runner = runner_with(spawner.clone());
        let options = ExecOptions::default();
        let ops = BranchOps::new(&runner, &options);

        ops.create("feature").await.unwrap();
        ops.create_and_switch("topic").await.unwrap();
        ops.switch("main").await.unwrap();
        ops.delete("feature", false).await.unwrap();
        ops.delete("topic", true).await.unwrap();

        assert_eq!(
            spawner.calls(),
            vec![
                vec!["branch", "feature"],
                vec!["checkout", "-b", "topic"],
                vec!["checkout", "main"],
                vec!["branch", "-d", "feature"],
                vec!["branch", "-D", "topic"],
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let spawner = Arc::new(ScriptedSpawner::new(|_| {
            Reply::failed(1, "error: pathspec 'nope' did not match any file(s) known to git")
        }));
        let runner = runner_with(spawner);
        let options = ExecOptions::default();

        let err = BranchOps::new(&runner, &options)
            .switch("nope")
            .await
            .unwrap_err();

        match err {
            GitError::CommandFailed(msg) => {
                assert!(msg.contains("Switching to branch 'nope'"));
                assert!(msg.contains("did not match"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
