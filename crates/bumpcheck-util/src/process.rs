//! Captured, run-to-completion command execution.
//!
//! Used for short query commands such as `mvn --version`; the long-running build
//! itself is streamed by `bumpcheck-maven`.

use std::process::Command;

use crate::error::UtilError;

/// Structured output from a command execution.
#[derive(Debug)]
pub struct CommandOutput {
    /// Standard output as a string.
    pub stdout: String,
    /// Standard error as a string.
    pub stderr: String,
    /// Whether the command exited successfully.
    pub success: bool,
    /// The exit code, if the process was not killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Stdout if it has any non-blank content, otherwise stderr, trimmed.
    pub fn primary_text(&self) -> &str {
        if self.stdout.trim().is_empty() {
            self.stderr.trim()
        } else {
            self.stdout.trim()
        }
    }
}

/// Execute a command and capture its output.
///
/// # Errors
/// Returns an error if the command cannot be spawned (e.g. binary not found).
/// A non-zero exit code is **not** an error; check `CommandOutput::success` instead.
pub fn run_command(cmd: &mut Command) -> Result<CommandOutput, UtilError> {
    let output = cmd
        .output()
        .map_err(|source| UtilError::CommandExec { source })?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
        exit_code: output.status.code(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn run_command_success() {
        let output = run_command(Command::new("sh").arg("-c").arg("echo Apache Maven 3.9.6")).unwrap();
        assert!(output.success);
        assert_eq!(output.primary_text(), "Apache Maven 3.9.6");
        assert_eq!(output.exit_code, Some(0));
    }

    #[test]
    fn run_command_nonzero_is_not_an_error() {
        let output = run_command(Command::new("sh").arg("-c").arg("exit 3")).unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
    }

    #[test]
    fn run_command_missing_binary() {
        let err = run_command(&mut Command::new("nonexistent_binary_xyz_123")).unwrap_err();
        assert!(err.to_string().contains("cannot execute command"));
    }

    #[test]
    fn primary_text_falls_back_to_stderr() {
        let output = run_command(Command::new("sh").arg("-c").arg("echo only-err >&2")).unwrap();
        assert_eq!(output.primary_text(), "only-err");
    }
}
