//! Maven invocation with streamed standard output.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::error::MavenError;

/// Exit state of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStatus {
    /// Whether the build exited successfully.
    pub success: bool,
    /// The exit code, if the process was not killed by a signal.
    pub exit_code: Option<i32>,
}

/// Arguments every build starts with. Batch mode keeps the output free of
/// colour codes so line prefixes stay literal.
const BASE_ARGS: [&str; 4] = ["--batch-mode", "clean", "compile", "--fail-at-end"];

/// Builder for constructing an `mvn clean compile` invocation.
#[derive(Debug, Clone, Default)]
pub struct MavenCommand {
    java_home: Option<PathBuf>,
    extra_args: Vec<String>,
    build_log: Option<PathBuf>,
}

impl MavenCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set JAVA_HOME for the build.
    pub fn java_home(mut self, path: &Path) -> Self {
        self.java_home = Some(path.to_path_buf());
        self
    }

    /// Append arguments after `--fail-at-end`, e.g. `-Dmaven.repo.local=...` or `-o`.
    pub fn args(mut self, args: &[String]) -> Self {
        self.extra_args.extend_from_slice(args);
        self
    }

    /// Copy every raw output line to `path`.
    pub fn build_log(mut self, path: &Path) -> Self {
        self.build_log = Some(path.to_path_buf());
        self
    }

    /// Build the argument list without executing.
    pub fn build_args(&self) -> Vec<String> {
        BASE_ARGS
            .iter()
            .map(|a| (*a).to_owned())
            .chain(self.extra_args.iter().cloned())
            .collect()
    }

    /// Start the build with `maven` in `working_dir`.
    ///
    /// Standard output is piped and exposed through the returned [`BuildProcess`];
    /// standard error goes to the terminal.
    ///
    /// # Errors
    /// Returns an error if the build log cannot be created or the process cannot be spawned.
    pub fn spawn(&self, maven: &Path, working_dir: &Path) -> Result<BuildProcess, MavenError> {
        let mut cmd = Command::new(maven);
        cmd.args(self.build_args()).current_dir(working_dir);
        if let Some(jh) = &self.java_home {
            cmd.env("JAVA_HOME", jh);
        }
        tracing::info!(
            maven = %maven.display(),
            args = %self.build_args().join(" "),
            cwd = %working_dir.display(),
            "starting build"
        );
        BuildProcess::spawn(cmd, self.build_log.as_deref())
    }
}

/// A running build whose standard output is read line by line.
///
/// Iterating yields lines in production order with terminators stripped and
/// invalid UTF-8 replaced. A read error ends the iteration and is reported by
/// [`BuildProcess::wait`].
#[derive(Debug)]
pub struct BuildProcess {
    program: String,
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
    log: Option<(PathBuf, BufWriter<File>)>,
    error: Option<MavenError>,
}

impl BuildProcess {
    /// Spawn `cmd` with piped stdout, inherited stderr, and no stdin.
    ///
    /// # Errors
    /// Returns an error if `build_log` cannot be created or the process cannot be spawned.
    pub fn spawn(mut cmd: Command, build_log: Option<&Path>) -> Result<Self, MavenError> {
        let program = cmd.get_program().to_string_lossy().into_owned();

        let log = build_log
            .map(|path| -> Result<_, MavenError> {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    bumpcheck_util::fs::ensure_dir(parent)?;
                }
                File::create(path)
                    .map(|file| (path.to_path_buf(), BufWriter::new(file)))
                    .map_err(|source| MavenError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            })
            .transpose()?;

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| MavenError::Exec {
                program: program.clone(),
                source,
            })?;
        let stdout = child.stdout.take().map(BufReader::new);

        Ok(Self {
            program,
            child,
            stdout,
            log,
            error: None,
        })
    }

    /// Drain any unread output, then wait for the process to exit.
    ///
    /// A non-zero exit is reported through [`BuildStatus`], not as an error.
    ///
    /// # Errors
    /// Returns an error if reading the output or writing the build log failed,
    /// or the process could not be waited on.
    pub fn wait(mut self) -> Result<BuildStatus, MavenError> {
        let drained = self.by_ref().count();
        if drained > 0 {
            tracing::debug!(lines = drained, "drained remaining build output");
        }

        if let Some((path, mut writer)) = self.log.take() {
            if let Err(source) = writer.flush() {
                self.error.get_or_insert(MavenError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        }

        let status = self.child.wait().map_err(|source| MavenError::Exec {
            program: self.program.clone(),
            source,
        })?;

        if let Some(err) = self.error.take() {
            return Err(err);
        }

        tracing::info!(exit_code = ?status.code(), "build finished");
        Ok(BuildStatus {
            success: status.success(),
            exit_code: status.code(),
        })
    }

    fn tee(&mut self, line: &str) {
        let Some((path, writer)) = self.log.as_mut() else {
            return;
        };
        if let Err(source) = writeln!(writer, "{line}") {
            let path = path.display().to_string();
            tracing::warn!(path = %path, "cannot write build log, disabling it");
            self.error.get_or_insert(MavenError::Io { path, source });
            self.log = None;
        }
    }
}

impl Iterator for BuildProcess {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let reader = self.stdout.as_mut()?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.stdout = None;
                None
            }
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                self.tee(&line);
                Some(line)
            }
            Err(source) => {
                self.error.get_or_insert(MavenError::Io {
                    path: format!("{} stdout", self.program),
                    source,
                });
                self.stdout = None;
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn build_args_default() {
        assert_eq!(
            MavenCommand::new().build_args(),
            vec!["--batch-mode", "clean", "compile", "--fail-at-end"]
        );
    }

    #[test]
    fn build_args_append_extra_arguments() {
        let args = MavenCommand::new()
            .args(&["-Dmaven.repo.local=local-repo".to_owned()])
            .args(&["-o".to_owned()])
            .build_args();
        assert_eq!(
            args,
            vec![
                "--batch-mode",
                "clean",
                "compile",
                "--fail-at-end",
                "-Dmaven.repo.local=local-repo",
                "-o"
            ]
        );
    }

    #[test]
    fn lines_stream_in_order() {
        let mut process = BuildProcess::spawn(sh("printf 'one\\ntwo\\r\\nthree'"), None).unwrap();
        let lines: Vec<String> = process.by_ref().collect();
        assert_eq!(lines, vec!["one", "two", "three"]);

        let status = process.wait().unwrap();
        assert!(status.success);
        assert_eq!(status.exit_code, Some(0));
    }

    #[test]
    fn nonzero_exit_is_not_an_error() {
        let process = BuildProcess::spawn(sh("echo '[ERROR] BUILD FAILURE'; exit 1"), None).unwrap();
        let status = process.wait().unwrap();
        assert!(!status.success);
        assert_eq!(status.exit_code, Some(1));
    }

    #[test]
    fn wait_drains_large_output() {
        // Well beyond a pipe buffer; the child would block if the pipe were not drained.
        let mut process =
            BuildProcess::spawn(sh("i=0; while [ $i -lt 20000 ]; do echo \"[INFO] line $i\"; i=$((i+1)); done"), None)
                .unwrap();
        assert_eq!(process.next().as_deref(), Some("[INFO] line 0"));
        let status = process.wait().unwrap();
        assert!(status.success);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut process = BuildProcess::spawn(sh("printf 'caf\\351\\n'"), None).unwrap();
        assert_eq!(process.next().as_deref(), Some("caf\u{fffd}"));
        assert!(process.next().is_none());
        process.wait().unwrap();
    }

    #[test]
    fn build_log_receives_every_line() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("logs/build.log");
        let mut process = BuildProcess::spawn(sh("echo a; echo b; echo c"), Some(&log)).unwrap();

        // Only consume one line; the rest are teed while draining.
        assert_eq!(process.next().as_deref(), Some("a"));
        process.wait().unwrap();

        assert_eq!(std::fs::read_to_string(&log).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn spawn_failure_is_exec_error() {
        let err = BuildProcess::spawn(Command::new("nonexistent_mvn_xyz_123"), None).unwrap_err();
        assert!(matches!(err, MavenError::Exec { .. }));
        assert!(err.to_string().contains("nonexistent_mvn_xyz_123"));
    }

    #[test]
    fn maven_command_passes_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        let mut process = MavenCommand::new()
            .args(&["-DskipTests".to_owned()])
            .spawn(Path::new("echo"), tmp.path())
            .unwrap();

        let lines: Vec<String> = process.by_ref().collect();
        process.wait().unwrap();
        assert_eq!(lines, vec!["--batch-mode clean compile --fail-at-end -DskipTests"]);
    }
}
