use serde::Serialize;

use crate::error::{GitError, GitResult};
use crate::git::executor::{ExecOptions, GitRunner};

/// Oldest git with `status --porcelain=v2 --branch`
const MIN_GIT_VERSION: (u32, u32) = (2, 13);

/// Represents a git version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// Ask the runner's git for its version
    ///
    /// Runs in the system temp dir so no repository needs to be resolvable.
    pub async fn detect(runner: &GitRunner) -> GitResult<Self> {
        let options = ExecOptions::in_dir(std::env::temp_dir());
        let output = runner
            .execute(&["--version"], &options)
            .await?
            .check("git --version")?;

        Self::parse(&output.stdout)
    }

    /// Parse git version from string like "git version 2.39.2"
    pub fn parse(version_str: &str) -> GitResult<Self> {
        // Also seen: "git version 2.39.2.windows.1", "git version 2.39.3 (Apple Git-145)"
        let parts: Vec<&str> = version_str.split_whitespace().collect();

        if parts.len() < 3 || parts[0] != "git" || parts[1] != "version" {
            return Err(GitError::ParseError(format!(
                "Unexpected git version format: {}",
                version_str.trim()
            )));
        }

        let nums: Vec<&str> = parts[2].split('.').collect();
        if nums.len() < 2 {
            return Err(GitError::ParseError(format!(
                "Invalid version number format: {}",
                parts[2]
            )));
        }

        let major = nums[0]
            .parse::<u32>()
            .map_err(|_| GitError::ParseError(format!("Invalid major version: {}", nums[0])))?;

        let minor = nums[1]
            .parse::<u32>()
            .map_err(|_| GitError::ParseError(format!("Invalid minor version: {}", nums[1])))?;

        // rc builds carry suffixes like "0-rc1"
        let patch = nums
            .get(2)
            .and_then(|p| p.split(|c: char| !c.is_ascii_digit()).next())
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(0);

        Ok(GitVersion {
            major,
            minor,
            patch,
        })
    }

    /// Check if this version meets minimum requirements
    pub fn is_supported(&self) -> bool {
        (self.major, self.minor) >= MIN_GIT_VERSION
    }

    /// Detect and reject gits too old for the status protocol
    pub async fn validate(runner: &GitRunner) -> GitResult<Self> {
        let version = Self::detect(runner).await?;

        if !version.is_supported() {
            return Err(GitError::GitVersionTooOld(version.to_string()));
        }

        Ok(version)
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
