//! Process-spawning collaborator used by [`GitRunner`](crate::git::GitRunner).
//!
//! [`Spawner`] starts a child from an argument vector and hands back its two
//! output streams plus an [`ExitWaiter`]. [`ExecPool`] bounds how many
//! children may run at once; its permit is the execution resource handle and
//! is returned to the pool when dropped.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{GitError, GitResult};

/// Boxed output stream of a spawned process
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Waits for a spawned process to exit
#[async_trait]
pub trait ExitWaiter: Send {
    /// Resolve to the exit code. Processes killed by a signal report -1.
    async fn wait(&mut self) -> io::Result<i32>;
}

/// A started child process with both output streams still unread
pub struct SpawnedProcess {
    pub stdout: OutputStream,
    pub stderr: OutputStream,
    pub exit: Box<dyn ExitWaiter>,
}

/// Starts processes from an argument vector
pub trait Spawner: Send + Sync {
    fn spawn(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<SpawnedProcess>;
}

/// Production spawner backed by `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSpawner;

struct ChildExit(Child);

#[async_trait]
impl ExitWaiter for ChildExit {
    async fn wait(&mut self) -> io::Result<i32> {
        let status = self.0.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<SpawnedProcess> {
        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not piped"))?;

        Ok(SpawnedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit: Box::new(ChildExit(child)),
        })
    }
}

/// Bounded pool of execution slots
#[derive(Debug, Clone)]
pub struct ExecPool {
    slots: Arc<Semaphore>,
}

/// A held execution slot. Dropping it returns the slot to the pool.
#[derive(Debug)]
pub struct ExecPermit {
    _permit: OwnedSemaphorePermit,
}

impl ExecPool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> GitResult<ExecPermit> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| GitError::ResourceUnavailable("execution pool is closed".to_string()))?;
        Ok(ExecPermit { _permit: permit })
    }

    /// Number of slots not currently held
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Refuse all future acquisitions
    pub fn close(&self) {
        self.slots.close();
    }
}

impl Default for ExecPool {
    fn default() -> Self {
        Self::new(8)
    }
}
