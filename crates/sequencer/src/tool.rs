//! External process invocation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Keep this much of stderr in error messages.
const STDERR_TAIL_BYTES: usize = 2000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{program} exited with {}: {stderr}", exit_label(.status))]
    Failed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("I/O error running {program}: {message}")]
    Io { program: String, message: String },
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// A program run to completion in a working directory.
#[async_trait]
pub trait ExternalTool: Send + Sync {
    async fn run(&self, args: &[String], working_dir: &Path) -> Result<ToolOutput, ProcessError>;
}

/// Runs a real executable via `tokio::process`.
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: PathBuf,
}

impl CommandTool {
    /// A bare name is looked up on `PATH`. A relative path such as
    /// `./bin/ffmpeg` is resolved against the current directory, since
    /// the tool runs with a different working directory.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let program = if program.components().count() > 1 {
            absolute_path(program)
        } else {
            program
        };
        Self { program }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl ExternalTool for CommandTool {
    async fn run(&self, args: &[String], working_dir: &Path) -> Result<ToolOutput, ProcessError> {
        debug!(
            program = %self.program.display(),
            args = ?args,
            cwd = %working_dir.display(),
            "Running external tool"
        );

        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ProcessError::NotFound(self.program_name()),
                _ => ProcessError::Io {
                    program: self.program_name(),
                    message: e.to_string(),
                },
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        check_status(&self.program_name(), output.status, &stderr)?;
        Ok(ToolOutput { stdout, stderr })
    }
}

/// Resolve a relative path against the current directory.
pub fn absolute_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

fn check_status(program: &str, status: ExitStatus, stderr: &str) -> Result<(), ProcessError> {
    if status.success() {
        return Ok(());
    }
    Err(ProcessError::Failed {
        program: program.to_string(),
        status: status.code(),
        stderr: tail(stderr, STDERR_TAIL_BYTES).trim().to_string(),
    })
}

/// Last `max` bytes of `s`, cut on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
