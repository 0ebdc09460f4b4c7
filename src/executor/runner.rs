//! Program invocation
//!
//! Runs one external program against one test case and captures its stdout.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{GraderError, GraderResult};
use crate::models::TestCase;
use crate::utils::Timer;

/// How an invocation ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Non-zero exit, or killed by a signal when the code is `None`
    Failed(Option<i32>),
    TimedOut,
}

/// Captured result of one invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramOutput {
    /// Stdout with a single trailing newline removed
    pub stdout: String,
    pub status: RunStatus,
    pub duration_ms: u64,
}

impl ProgramOutput {
    pub fn new(raw_stdout: &[u8], status: RunStatus, duration_ms: u64) -> Self {
        let stdout = strip_trailing_newline(String::from_utf8_lossy(raw_stdout).into_owned());
        Self {
            stdout,
            status,
            duration_ms,
        }
    }

    pub fn timed_out(duration_ms: u64) -> Self {
        Self {
            stdout: String::new(),
            status: RunStatus::TimedOut,
            duration_ms,
        }
    }
}

/// Remove exactly one trailing `\n`, leaving any other whitespace alone.
pub fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Invokes a program with a test case path as its only argument.
///
/// Returns `Err` only when the program cannot be started. Crashes, non-zero
/// exits and timeouts are reported through [`RunStatus`].
#[allow(async_fn_in_trait)]
pub trait ProgramRunner {
    /// Verify `program` can be launched before any test case runs
    fn check(&self, program: &Path) -> GraderResult<()>;

    async fn run(&self, program: &Path, test_case: &TestCase) -> GraderResult<ProgramOutput>;
}

/// Locate `program` the way `Command` does: a bare name is searched on
/// `PATH`, anything with a directory component is taken as a path.
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Runs programs as child processes
#[derive(Clone, Debug, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

/// Drain stdout to EOF, then reap the child
async fn read_until_exit(
    child: &mut Child,
    mut stdout: ChildStdout,
) -> io::Result<(Vec<u8>, ExitStatus)> {
    let mut buf = Vec::new();
    stdout.read_to_end(&mut buf).await?;
    let status = child.wait().await?;
    Ok((buf, status))
}

impl ProgramRunner for ProcessRunner {
    fn check(&self, program: &Path) -> GraderResult<()> {
        match resolve_program(program) {
            Some(resolved) => {
                debug!("{} resolved to {}", program.display(), resolved.display());
                Ok(())
            }
            None => Err(GraderError::ExecutableNotFound(program.to_path_buf())),
        }
    }

    async fn run(&self, program: &Path, test_case: &TestCase) -> GraderResult<ProgramOutput> {
        let timer = Timer::start(format!("{} {}", program.display(), test_case));
        let io_error = |source: io::Error| GraderError::Io {
            path: program.to_path_buf(),
            source,
        };

        let mut child = Command::new(program)
            .arg(&test_case.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GraderError::Launch {
                program: program.to_path_buf(),
                source,
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io_error(io::Error::other("stdout was not captured")))?;

        let finished = match self.timeout {
            Some(limit) => timeout(limit, read_until_exit(&mut child, stdout)).await.ok(),
            None => Some(read_until_exit(&mut child, stdout).await),
        };

        let (raw_stdout, exit_status) = match finished {
            Some(result) => result.map_err(io_error)?,
            None => {
                warn!(
                    "{} timed out after {}ms on {}",
                    program.display(),
                    self.timeout.unwrap_or_default().as_millis(),
                    test_case
                );
                // kill() waits for the child, so it is reaped here
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {}: {}", program.display(), e);
                }
                return Ok(ProgramOutput::timed_out(timer.stop_ms()));
            }
        };

        let status = if exit_status.success() {
            RunStatus::Success
        } else {
            debug!(
                "{} exited with {} on {}",
                program.display(),
                exit_status,
                test_case
            );
            RunStatus::Failed(exit_status.code())
        };

        Ok(ProgramOutput::new(&raw_stdout, status, timer.stop_ms()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_single_trailing_newline() {
        assert_eq!(strip_trailing_newline("42\n".to_string()), "42");
        assert_eq!(strip_trailing_newline("42".to_string()), "42");
        assert_eq!(strip_trailing_newline("42\n\n".to_string()), "42\n");
        assert_ne!(strip_trailing_newline("42\n\n".to_string()), "42");
        assert_eq!(strip_trailing_newline("42 \t".to_string()), "42 \t");
        assert_eq!(strip_trailing_newline("\n".to_string()), "");
    }

    #[test]
    fn test_output_from_raw_bytes() {
        let output = ProgramOutput::new(b"7 13\n", RunStatus::Success, 3);
        assert_eq!(output.stdout, "7 13");
        assert_eq!(output.status, RunStatus::Success);
    }

    #[test]
    fn test_output_lossy_utf8() {
        let output = ProgramOutput::new(&[0x34, 0xff, b'\n'], RunStatus::Failed(Some(1)), 0);
        assert_eq!(output.stdout, "4\u{fffd}");
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use tempfile::tempdir;

        fn script(dir: &Path, name: &str, body: &str) -> TestCase {
            std::fs::write(dir.join(name), body).unwrap();
            TestCase::new(dir, name)
        }

        #[tokio::test]
        async fn test_captures_stdout() {
            let dir = tempdir().unwrap();
            let case = script(dir.path(), "t1", "echo 42\n");

            let output = ProcessRunner::default()
                .run(Path::new("/bin/sh"), &case)
                .await
                .unwrap();
            assert_eq!(output.stdout, "42");
            assert_eq!(output.status, RunStatus::Success);
        }

        #[tokio::test]
        async fn test_passes_path_as_sole_argument() {
            let dir = tempdir().unwrap();
            let case = script(dir.path(), "t1", "");

            let output = ProcessRunner::default()
                .run(Path::new("/bin/echo"), &case)
                .await
                .unwrap();
            assert_eq!(output.stdout, case.path.display().to_string());
        }

        #[tokio::test]
        async fn test_nonzero_exit_keeps_stdout() {
            let dir = tempdir().unwrap();
            let case = script(dir.path(), "t1", "echo partial\nexit 3\n");

            let output = ProcessRunner::default()
                .run(Path::new("/bin/sh"), &case)
                .await
                .unwrap();
            assert_eq!(output.stdout, "partial");
            assert_eq!(output.status, RunStatus::Failed(Some(3)));
        }

        #[tokio::test]
        async fn test_timeout_kills_child() {
            let dir = tempdir().unwrap();
            let case = script(dir.path(), "t1", "echo early\nsleep 5\n");

            let runner = ProcessRunner::new(Some(Duration::from_millis(200)));
            let output = runner.run(Path::new("/bin/sh"), &case).await.unwrap();
            assert_eq!(output.status, RunStatus::TimedOut);
            assert!(output.duration_ms < 5000);
        }

        #[cfg(target_os = "linux")]
        #[tokio::test]
        async fn test_timed_out_child_is_reaped() {
            let dir = tempdir().unwrap();
            let case = script(
                dir.path(),
                "t1",
                "echo $$ > \"$(dirname \"$0\")/pid\"\nexec sleep 5\n",
            );

            let runner = ProcessRunner::new(Some(Duration::from_millis(500)));
            let output = runner.run(Path::new("/bin/sh"), &case).await.unwrap();
            assert_eq!(output.status, RunStatus::TimedOut);

            let pid = std::fs::read_to_string(dir.path().join("pid")).unwrap();
            let proc_entry = PathBuf::from(format!("/proc/{}", pid.trim()));
            assert!(!proc_entry.exists(), "child {} left unreaped", pid.trim());
        }

        #[test]
        fn test_check_resolves_like_command() {
            let runner = ProcessRunner::default();
            assert!(runner.check(Path::new("sh")).is_ok());
            assert!(runner.check(Path::new("/bin/sh")).is_ok());
            assert!(matches!(
                runner.check(Path::new("no-such-grader-program")),
                Err(GraderError::ExecutableNotFound(_))
            ));
            assert!(runner.check(Path::new("./no-such-dir/serial")).is_err());
        }

        #[test]
        fn test_check_rejects_directory() {
            let dir = tempdir().unwrap();
            assert!(ProcessRunner::default().check(dir.path()).is_err());
        }

        #[tokio::test]
        async fn test_missing_program_is_launch_error() {
            let dir = tempdir().unwrap();
            let case = script(dir.path(), "t1", "");

            let err = ProcessRunner::default()
                .run(&dir.path().join("serial"), &case)
                .await
                .unwrap_err();
            assert!(matches!(err, GraderError::Launch { .. }));
        }

        #[tokio::test]
        async fn test_non_executable_is_launch_error() {
            let dir = tempdir().unwrap();
            let case = script(dir.path(), "t1", "");

            let err = ProcessRunner::default()
                .run(&case.path, &case)
                .await
                .unwrap_err();
            assert!(matches!(err, GraderError::Launch { .. }));
        }
    }
}
