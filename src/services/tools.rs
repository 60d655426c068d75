//! Bounded execution of external command-line tools.
//!
//! Every tool is invoked as `<program> [args...] <path>` with stdin closed and
//! both output pipes captured. The child is killed if the wait exceeds the
//! configured timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

/// Values of `LINTER_COMMAND` / `FORMATTER_COMMAND` that disable the tool
const DISABLED: &[&str] = &["none", "noop", "disabled", "off"];

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to start '{tool}': {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("'{tool}' timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("I/O error while running '{tool}': {source}")]
    Io {
        tool: String,
        source: std::io::Error,
    },
}

/// Captured result of one tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// A program plus its fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Parses a whitespace-separated command line. Returns `None` for an empty
    /// line or one of the disabled markers.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        if DISABLED.iter().any(|d| d.eq_ignore_ascii_case(program)) {
            return None;
        }
        Some(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }

    pub async fn run(&self, path: &Path, timeout: Duration) -> Result<ToolOutput, ToolError> {
        let started = Instant::now();

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                tool: self.program.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ToolError::Timeout {
                tool: self.program.clone(),
                timeout,
            })?
            .map_err(|source| ToolError::Io {
                tool: self.program.clone(),
                source,
            })?;

        tracing::debug!(
            "{} finished in {:?} with status {}",
            self.program,
            started.elapsed(),
            output.status
        );

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        assert_eq!(
            ToolCommand::parse("pylint --score=n"),
            Some(ToolCommand::new("pylint", &["--score=n"]))
        );
        assert_eq!(ToolCommand::parse("  black  "), Some(ToolCommand::new("black", &[])));
        assert_eq!(ToolCommand::parse(""), None);
        assert_eq!(ToolCommand::parse("none"), None);
        assert_eq!(ToolCommand::parse("Disabled"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ToolCommand::new("black", &["-q", "--fast"]).to_string(),
            "black -q --fast"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_both_streams_and_exit_code() {
        // With `sh -c`, the appended path becomes $0.
        let tool = ToolCommand::new("sh", &["-c", "echo \"checked $0\"; echo warn >&2; exit 3"]);
        let output = tool
            .run(Path::new("sample.py"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.stdout, "checked sample.py\n");
        assert_eq!(output.stderr, "warn\n");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let tool = ToolCommand::new("sh", &["-c", "sleep 5"]);
        let started = Instant::now();
        let err = tool
            .run(Path::new("sample.py"), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let tool = ToolCommand::new("definitely-not-an-installed-linter", &[]);
        let err = tool
            .run(Path::new("sample.py"), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Spawn { .. }));
        assert!(err.to_string().contains("definitely-not-an-installed-linter"));
    }
}
