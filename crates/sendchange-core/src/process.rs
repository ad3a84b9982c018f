use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// Errors from running an external command
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start {binary}: {source}")]
    SpawnFailed {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} exited with code {exit_code}: {stderr}")]
    NonZeroExit {
        binary: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("I/O error talking to {binary}: {source}")]
    Io {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}

/// Output captured from a finished process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, -1 when killed by a signal
    pub exit_code: i32,
    pub duration: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands from an argument vector, never through a shell
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    working_dir: Option<PathBuf>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self { working_dir: None }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run `binary` with `args`, feeding `input` to its stdin, and capture
    /// its output.
    ///
    /// Stdin is closed once `input` is written (or immediately when there is
    /// none). Stdout and stderr are decoded lossily.
    pub async fn run(
        &self,
        binary: &Path,
        args: &[String],
        input: Option<&[u8]>,
    ) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();
        let binary_name = binary.display().to_string();

        debug!(
            binary = %binary_name,
            args = ?args,
            stdin_len = input.map_or(0, <[u8]>::len),
            "Spawning process"
        );

        let mut cmd = Command::new(binary);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessError::SpawnFailed {
            binary: binary_name.clone(),
            source,
        })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(bytes)) = (stdin, input) {
                pipe.write_all(bytes).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        // Feed stdin while collecting output so neither side can stall on a
        // full pipe.
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        match fed {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                trace!(binary = %binary_name, "Process closed stdin early");
            }
            Err(source) => {
                return Err(ProcessError::Io {
                    binary: binary_name,
                    source,
                })
            }
            Ok(()) => {}
        }

        let output = output.map_err(|source| ProcessError::Io {
            binary: binary_name.clone(),
            source,
        })?;
        let duration = start.elapsed();
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            binary = %binary_name,
            exit_code,
            duration_ms = duration.as_millis(),
            "Process completed"
        );

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
            duration,
        })
    }

    /// Like [`run`](Self::run), but a non-zero exit is an error
    pub async fn run_checked(
        &self,
        binary: &Path,
        args: &[String],
        input: Option<&[u8]>,
    ) -> Result<ProcessOutput, ProcessError> {
        let output = self.run(binary, args, input).await?;

        if output.success() {
            Ok(output)
        } else {
            Err(ProcessError::NonZeroExit {
                binary: binary.display().to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[tokio::test]
    async fn test_stdin_is_delivered() {
        let output = ProcessRunner::new()
            .run_checked(Path::new("cat"), &[], Some(b"Fix bug\n".as_slice()))
            .await
            .unwrap();

        assert_eq!(output.stdout, "Fix bug\n");
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let output = ProcessRunner::new()
            .run_checked(Path::new("echo"), &args(&["$(whoami)", "a;b", "\"q\""]), None)
            .await
            .unwrap();

        assert_eq!(output.stdout, "$(whoami) a;b \"q\"\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let err = ProcessRunner::new()
            .run_checked(Path::new("false"), &[], None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::NonZeroExit { exit_code: 1, .. }));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let err = ProcessRunner::new()
            .run(Path::new("/nonexistent/sendchange-test-binary"), &[], None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_working_dir() {
        let dir = std::env::temp_dir();
        let output = ProcessRunner::new()
            .with_working_dir(&dir)
            .run_checked(Path::new("pwd"), &[], None)
            .await
            .unwrap();

        let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(&dir).unwrap());
    }
}
