//! Scripted [`Spawner`] for unit tests that must not touch a real git.

use async_trait::async_trait;
use std::io::{self, Cursor};
use std::path::Path;
use std::sync::Mutex;

use crate::git::process::{ExitWaiter, SpawnedProcess, Spawner};

/// Canned outcome for one spawned command
#[derive(Debug, Clone)]
pub struct Reply {
    stdout: String,
    stderr: String,
    exit_code: i32,
    spawn_fails: bool,
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
            spawn_fails: false,
        }
    }

    pub fn failed(exit_code: i32, stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code,
            spawn_fails: false,
        }
    }

    pub fn spawn_error() -> Self {
        Self {
            spawn_fails: true,
            ..Self::ok("")
        }
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }
}

type Script = Box<dyn Fn(&[String]) -> Reply + Send + Sync>;

/// Answers each spawn with the reply the script picks for its arguments
pub struct ScriptedSpawner {
    script: Script,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedSpawner {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&[String]) -> Reply + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Argument vectors seen so far, in spawn order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

struct FixedExit(i32);

#[async_trait]
impl ExitWaiter for FixedExit {
    async fn wait(&mut self) -> io::Result<i32> {
        Ok(self.0)
    }
}

impl Spawner for ScriptedSpawner {
    fn spawn(&self, _program: &str, args: &[String], _cwd: &Path) -> io::Result<SpawnedProcess> {
        self.calls.lock().unwrap().push(args.to_vec());

        let reply = (self.script)(args);
        if reply.spawn_fails {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }

        Ok(SpawnedProcess {
            stdout: Box::new(Cursor::new(reply.stdout.into_bytes())),
            stderr: Box::new(Cursor::new(reply.stderr.into_bytes())),
            exit: Box::new(FixedExit(reply.exit_code)),
        })
    }
}
