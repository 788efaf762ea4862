use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::audit::AuditLogger;
use crate::config::{Config, FixedRoot, REPO_ROOT_KEY, SettingsLookup};
use crate::error::{GitError, GitResult};
use crate::git::process::{ExecPool, OutputStream, SpawnedProcess, Spawner, TokioSpawner};

const READ_CHUNK: usize = 8 * 1024;

/// Result of executing a git command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

impl CommandResult {
    pub fn new(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            success: exit_code == 0,
        }
    }

    /// Turn a non-zero exit into [`GitError::CommandFailed`] naming `action`
    pub fn check(self, action: &str) -> GitResult<Self> {
        if self.success {
            return Ok(self);
        }

        let detail = match self.stderr.trim() {
            "" => self.stdout.trim(),
            stderr => stderr,
        };
        Err(GitError::CommandFailed(format!(
            "{} failed with exit code {}: {}",
            action, self.exit_code, detail
        )))
    }
}

/// Reject a missing or blank required argument before anything is spawned
pub fn require_arg<'v>(name: &str, value: &'v str) -> GitResult<&'v str> {
    if value.trim().is_empty() {
        return Err(GitError::InvalidArgument(format!("{} is required", name)));
    }
    Ok(value)
}

/// Like [`require_arg`], and also refuses values git would read as an option
pub fn require_ref<'v>(name: &str, value: &'v str) -> GitResult<&'v str> {
    let value = require_arg(name, value)?;
    if value.starts_with('-') {
        return Err(GitError::InvalidArgument(format!(
            "{} must not start with '-': {}",
            name, value
        )));
    }
    Ok(value)
}

/// Per-call execution options
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Overrides the configured repository root
    pub working_dir: Option<PathBuf>,
    /// Bounded wait; `None` falls back to the runner default (unbounded unless configured)
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            working_dir: Some(dir.into()),
            timeout: None,
        }
    }
}

/// Executes git commands as child processes
///
/// Arguments go to the child as an argument vector; nothing passes through a
/// shell. The quoted command line is only rendered for logs and the audit trail.
pub struct GitRunner {
    program: String,
    spawner: Arc<dyn Spawner>,
    pool: ExecPool,
    settings: Arc<dyn SettingsLookup>,
    default_timeout: Option<Duration>,
    audit: Option<Arc<AuditLogger>>,
}

impl std::fmt::Debug for GitRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRunner")
            .field("program", &self.program)
            .field("pool", &self.pool)
            .field("default_timeout", &self.default_timeout)
            .field("audit", &self.audit.as_ref().map(|a| a.log_path().to_path_buf()))
            .finish_non_exhaustive()
    }
}

impl GitRunner {
    /// Create a runner that resolves its working directory through `settings`
    pub fn new(settings: Arc<dyn SettingsLookup>) -> Self {
        Self {
            program: "git".to_string(),
            spawner: Arc::new(TokioSpawner),
            pool: ExecPool::default(),
            settings,
            default_timeout: None,
            audit: None,
        }
    }

    /// Create a runner pinned to a known repository root
    pub fn for_repo<P: AsRef<Path>>(repo_path: P) -> Self {
        Self::new(Arc::new(FixedRoot(repo_path.as_ref().to_path_buf())))
    }

    /// Create a runner from a loaded configuration file
    pub fn from_config(config: &Config) -> io::Result<Self> {
        let mut runner = Self::new(Arc::new(config.clone()))
            .with_program(&config.git.program)
            .with_pool(ExecPool::new(config.git.max_concurrent_processes));

        if let Some(secs) = config.git.timeout_seconds {
            runner = runner.with_timeout(Duration::from_secs(secs));
        }

        if config.audit.enabled {
            let logger = match &config.audit.log_path {
                Some(path) => AuditLogger::with_path(path)?,
                None => AuditLogger::new()?,
            };
            runner = runner.with_audit(Arc::new(logger));
        }

        Ok(runner)
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_pool(mut self, pool: ExecPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn pool(&self) -> &ExecPool {
        &self.pool
    }

    /// Resolve the directory commands run in when the caller gives none
    pub fn working_dir(&self, options: &ExecOptions) -> GitResult<PathBuf> {
        if let Some(dir) = &options.working_dir {
            return Ok(dir.clone());
        }

        self.settings
            .get_path(REPO_ROOT_KEY)
            .map_err(GitError::WorkingDirUnresolved)
    }

    /// Execute a git command and return its captured output
    ///
    /// A non-zero exit is not an error here; check [`CommandResult::success`]
    /// or use [`GitRunner::execute_checked`].
    pub async fn execute<S: AsRef<str>>(
        &self,
        args: &[S],
        options: &ExecOptions,
    ) -> GitResult<CommandResult> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        let working_dir = self.working_dir(options)?;
        let command_line = format!("{} {}", self.program, quote_args(&args));

        let _permit = self.pool.acquire().await?;
        debug!(command = %command_line, cwd = %working_dir.display(), "spawning");

        let outcome = match options.timeout.or(self.default_timeout) {
            Some(limit) => {
                match tokio::time::timeout(limit, self.run(&args, &working_dir)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(GitError::Timeout(limit)),
                }
            }
            None => self.run(&args, &working_dir).await,
        };

        if let Ok(result) = &outcome {
            debug!(command = %command_line, exit_code = result.exit_code, "finished");
        }
        self.record(
            &command_line,
            &working_dir,
            outcome.as_ref().ok().map(|r| r.exit_code),
        );

        outcome
    }

    /// Execute and turn a non-zero exit into [`GitError::CommandFailed`]
    pub async fn execute_checked<S: AsRef<str>>(
        &self,
        args: &[S],
        options: &ExecOptions,
    ) -> GitResult<CommandResult> {
        let subcommand = args.first().map(|a| a.as_ref()).unwrap_or_default();
        self.execute(args, options)
            .await?
            .check(&format!("Command '{} {}'", self.program, subcommand))
    }

    /// Execute a whole command line, e.g. `commit -m "first draft"`
    ///
    /// The line is split with [`split_command_line`]; a leading program name
    /// is dropped if present.
    pub async fn execute_line(
        &self,
        command: &str,
        options: &ExecOptions,
    ) -> GitResult<CommandResult> {
        let mut args = split_command_line(command)?;
        if args.first().is_some_and(|first| *first == self.program) {
            args.remove(0);
        }
        if args.is_empty() {
            return Err(GitError::InvalidArgument("Empty command".to_string()));
        }

        self.execute(&args, options).await
    }

    async fn run(&self, args: &[String], cwd: &Path) -> GitResult<CommandResult> {
        let SpawnedProcess {
            stdout,
            stderr,
            mut exit,
        } = self.spawner.spawn(&self.program, args, cwd).map_err(|e| {
            GitError::CommandFailed(format!("Failed to execute {}: {}", self.program, e))
        })?;

        // Both pipes must be drained while we wait, or a chatty child
        // blocks on a full pipe and never exits.
        let mut stdout_task = DrainTask::spawn(stdout);
        let mut stderr_task = DrainTask::spawn(stderr);

        let exit_code = exit.wait().await?;

        let stdout = stdout_task.join().await?;
        let stderr = stderr_task.join().await?;

        Ok(CommandResult::new(
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
            exit_code,
        ))
    }

    fn record(&self, command_line: &str, working_dir: &Path, exit_code: Option<i32>) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_command(command_line, working_dir, exit_code) {
                warn!(error = %e, "failed to write command audit log");
            }
        }
    }
}

/// Background reader for one output stream. Aborted if dropped unjoined.
struct DrainTask(JoinHandle<io::Result<Vec<u8>>>);

impl DrainTask {
    fn spawn(stream: OutputStream) -> Self {
        Self(tokio::spawn(drain(stream)))
    }

    async fn join(&mut self) -> GitResult<Vec<u8>> {
        let collected = (&mut self.0).await.map_err(io::Error::other)??;
        Ok(collected)
    }
}

impl Drop for DrainTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn drain(mut stream: OutputStream) -> io::Result<Vec<u8>> {
    let mut collected = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&chunk[..n]);
    }

    Ok(collected)
}

/// Wrap one argument in double quotes, escaping backslashes and quotes
pub fn quote_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Render an argument vector as a quoted, space-separated command line
pub fn quote_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| quote_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a command line into arguments
///
/// Whitespace separates arguments outside double quotes; a backslash escapes
/// the next character anywhere. Inverse of [`quote_args`].
pub fn split_command_line(line: &str) -> GitResult<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or_else(|| {
                    GitError::InvalidArgument("Trailing backslash in command".to_string())
                })?;
                current.push(escaped);
                in_token = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(GitError::InvalidArgument(
            "Unterminated quote in command".to_string(),
        ));
    }
    if in_token {
        args.push(current);
    }

    Ok(args)
}
