//! External command execution with a wall-clock timeout
//!
//! Every collector goes through [`CommandRunner`], so tests can script
//! command output without touching the host system.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, trace, warn};

/// Default timeout applied to every external command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised by a single command invocation
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started at all
    #[error("Command '{command}' could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited with a non-zero status
    #[error("Command '{command}' failed with exit code {}:\n{stderr}", display_code(.exit_code))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The program did not finish in time and was killed
    #[error("Command '{command}' hanged for {} seconds", display_secs(.timeout))]
    TimedOut { command: String, timeout: Duration },

    /// Reading output or waiting for the program failed
    #[error("Command '{command}' I/O error: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

fn display_secs(timeout: &Duration) -> String {
    timeout.as_secs_f32().to_string()
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "[killed by signal]".to_string(),
    }
}

/// Seam between collectors and the host's process table
pub trait CommandRunner {
    /// Runs `program` with `args` and returns its trimmed stdout
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;

    /// Looks up `program` on `PATH`
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Runs real processes on the host
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
    transcript_dir: Option<PathBuf>,
}

impl SystemCommandRunner {
    /// Creates a runner with the given timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            transcript_dir: None,
        }
    }

    /// Appends a transcript of every invocation to `<dir>/<program>.log`
    pub fn with_transcript_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transcript_dir = Some(dir.into());
        self
    }

    async fn run_async(&self, program: &str, args: &[&str]) -> Result<Captured, CommandError> {
        let command = command_line(program, args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();

        let outcome = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(
                read_all(stdout.as_mut()),
                read_all(stderr.as_mut()),
                child.wait()
            )
        })
        .await;

        match outcome {
            Ok(Ok((stdout, stderr, status))) => Ok(Captured {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                exit_code: status.code(),
                success: status.success(),
            }),
            Ok(Err(source)) => Err(CommandError::Io { command, source }),
            Err(_) => {
                // kill() also reaps the child
                if let Err(e) = child.kill().await {
                    warn!(command = %command, error = %e, "Failed to kill timed out command");
                }
                Err(CommandError::TimedOut {
                    command,
                    timeout: self.timeout,
                })
            }
        }
    }

    fn write_transcript(&self, program: &str, args: &[&str], captured: &Captured) {
        let Some(dir) = &self.transcript_dir else {
            return;
        };

        let name = Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.to_string());
        let path = dir.join(format!("{name}.log"));

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| {
                writeln!(file, "{}", "=".repeat(40))?;
                writeln!(file, "{}", command_line(program, args))?;
                writeln!(file, "exit code: {}", display_code(&captured.exit_code))?;
                writeln!(file, "stdout:\n{}", captured.stdout)?;
                writeln!(file, "stderr:\n{}", captured.stderr)?;
                writeln!(file, "{}", "=".repeat(40))
            });

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to write command transcript");
        }
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let command = command_line(program, args);
        debug!(command = %command, timeout = ?self.timeout, "Running command");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| CommandError::Io {
                command: command.clone(),
                source,
            })?;

        let captured = runtime.block_on(self.run_async(program, args))?;
        trace!(command = %command, stdout = %captured.stdout, stderr = %captured.stderr, "Command output");
        self.write_transcript(program, args, &captured);

        if !captured.success {
            return Err(CommandError::Failed {
                command,
                exit_code: captured.exit_code,
                stderr: captured.stderr.trim().to_string(),
            });
        }

        Ok(captured.stdout.trim().to_string())
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

struct Captured {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
    success: bool,
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<&mut R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
