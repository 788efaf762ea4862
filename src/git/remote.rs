use tracing::info;

use crate::error::{GitError, GitResult};
use crate::git::executor::{require_arg, require_ref, CommandResult, ExecOptions, GitRunner};
use crate::git::parser;
use crate::git::types::Remote;

/// Remote configuration and synchronisation
#[derive(Debug, Clone, Copy)]
pub struct RemoteOps<'a> {
    runner: &'a GitRunner,
    options: &'a ExecOptions,
}

impl<'a> RemoteOps<'a> {
    pub fn new(runner: &'a GitRunner, options: &'a ExecOptions) -> Self {
        Self { runner, options }
    }

    pub async fn list(&self) -> GitResult<Vec<Remote>> {
        let output = self
            .runner
            .execute(&["remote", "-v"], self.options)
            .await?
            .check("Listing remotes")?;

        Ok(parser::parse_remote_list(&output.stdout))
    }

    pub async fn add(&self, name: &str, url: &str) -> GitResult<()> {
        let name = require_ref("remote name", name)?;
        let url = require_arg("remote url", url)?;

        self.runner
            .execute(&["remote", "add", name, url], self.options)
            .await?
            .check(&format!("Adding remote '{}'", name))?;

        info!(remote = name, url, "added remote");
        Ok(())
    }

    pub async fn remove(&self, name: &str) -> GitResult<()> {
        let name = require_ref("remote name", name)?;

        self.runner
            .execute(&["remote", "remove", name], self.options)
            .await?
            .check(&format!("Removing remote '{}'", name))?;

        info!(remote = name, "removed remote");
        Ok(())
    }

    /// `git pull [remote [branch]]`
    pub async fn pull(&self, remote: Option<&str>, branch: Option<&str>) -> GitResult<CommandResult> {
        let mut args = vec!["pull"];
        args.extend(target(remote, branch)?);

        self.runner
            .execute(&args, self.options)
            .await?
            .check("Pull")
    }

    /// `git push [--force] [remote [branch]]`
    pub async fn push(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        force: bool,
    ) -> GitResult<CommandResult> {
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend(target(remote, branch)?);

        let result = self.runner.execute(&args, self.options).await?.check("Push")?;

        info!(remote = remote.unwrap_or_default(), force, "pushed");
        Ok(result)
    }

    /// `git fetch --all` or `git fetch [remote]`
    pub async fn fetch(&self, remote: Option<&str>, all: bool) -> GitResult<CommandResult> {
        let mut args = vec!["fetch"];
        match (all, remote) {
            (true, Some(_)) => {
                return Err(GitError::InvalidArgument(
                    "fetch takes either a remote or --all, not both".to_string(),
                ));
            }
            (true, None) => args.push("--all"),
            (false, Some(remote)) => args.push(require_ref("remote name", remote)?),
            (false, None) => {}
        }

        self.runner
            .execute(&args, self.options)
            .await?
            .check("Fetch")
    }
}

/// Positional `[remote [branch]]` tail shared by pull and push
fn target<'v>(remote: Option<&'v str>, branch: Option<&'v str>) -> GitResult<Vec<&'v str>> {
    match (remote, branch) {
        (None, None) => Ok(Vec::new()),
        (Some(remote), None) => Ok(vec![require_ref("remote name", remote)?]),
        (Some(remote), Some(branch)) => Ok(vec![
            require_ref("remote name", remote)?,
            require_ref("branch name", branch)?,
        ]),
        (None, Some(_)) => Err(GitError::InvalidArgument(
            "a branch needs a remote to go with it".to_string(),
        )),
    }
}
