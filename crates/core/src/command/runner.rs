use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

use super::CommandSpec;

/// Captured outcome of one finished process.
///
/// `stdout` and `stderr` are always present (possibly empty), even when the
/// process exited non-zero. On Unix, a process killed by a signal reports
/// the negated signal number as its exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Synchronous external-process executor.
///
/// Each `run` spawns exactly one OS process, blocks until it exits, and
/// returns the fully drained result. No shell is involved, no retry is
/// attempted, and no timeout is enforced.
#[derive(Debug, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run the command to completion and capture its outcome.
    ///
    /// A non-zero exit code is not an error; it is reported through
    /// [`CommandResult::exit_code`] and the caller decides significance.
    pub fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        debug!("running command: {spec}");

        let output = Command::new(spec.program())
            .args(spec.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| spawn_error(spec.program(), source))?;

        let exit_code = exit_code_of(&output.status);
        debug!(
            "command `{}` exited with code {exit_code}",
            spec.program()
        );

        Ok(CommandResult {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn spawn_error(program: &str, source: io::Error) -> Error {
    if source.kind() == io::ErrorKind::NotFound {
        Error::ExecutableNotFound {
            program: program.to_string(),
        }
    } else {
        Error::ProcessExecution {
            program: program.to_string(),
            source,
        }
    }
}

#[cfg(unix)]
fn exit_code_of(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| -sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code_of(status: &std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout_exactly() {
        let runner = CommandRunner::new();
        let result = runner
            .run(&CommandSpec::new("echo").arg("hello"))
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, b"hello\n");
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn test_no_shell_interpolation() {
        // `$PATH` must come back literally: the program is exec'd directly,
        // so there is no shell to expand it.
        let runner = CommandRunner::new();
        let result = runner
            .run(&CommandSpec::new("echo").arg("$PATH"))
            .unwrap();

        assert_eq!(result.stdout, b"$PATH\n");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let runner = CommandRunner::new();
        let result = runner.run(&CommandSpec::new("false")).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(!result.success());
        assert!(result.stdout.is_empty());
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn test_missing_executable() {
        let runner = CommandRunner::new();
        let err = runner
            .run(&CommandSpec::new("/nonexistent/binary"))
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ExecutableNotFound { ref program } if program == "/nonexistent/binary"
        ));
    }

    #[test]
    fn test_captures_stderr() {
        // `ls` on a missing path writes its complaint to stderr.
        let runner = CommandRunner::new();
        let result = runner
            .run(&CommandSpec::new("ls").arg("/definitely/not/here"))
            .unwrap();

        assert_ne!(result.exit_code, 0);
        assert!(result.stdout.is_empty());
        assert!(!result.stderr.is_empty());
    }
}
