use crate::services::tools::{ToolCommand, ToolError};
use std::path::Path;
use std::time::Duration;

/// Result of asking a formatter to rewrite a file in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The tool exited successfully; the file at the given path is now formatted
    Formatted,
    /// The tool refused the input (syntax error, unsupported construct, ...)
    Rejected { message: String },
}

/// Trait for in-place formatter implementations
#[async_trait::async_trait]
pub trait Formatter: Send + Sync {
    /// Rewrite the file at `path` in place
    async fn format(&self, path: &Path) -> Result<FormatOutcome, ToolError>;
}

/// Formatter backed by an external process (`black <path>` by default).
pub struct CommandFormatter {
    command: ToolCommand,
    timeout: Duration,
}

impl CommandFormatter {
    pub fn new(command: ToolCommand, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

#[async_trait::async_trait]
impl Formatter for CommandFormatter {
    async fn format(&self, path: &Path) -> Result<FormatOutcome, ToolError> {
        let output = self.command.run(path, self.timeout).await?;

        if output.success {
            return Ok(FormatOutcome::Formatted);
        }

        let message = if !output.stderr.trim().is_empty() {
            output.stderr
        } else if !output.stdout.trim().is_empty() {
            output.stdout
        } else {
            match output.exit_code {
                Some(code) => format!("{} exited with status {}", self.command.program, code),
                None => format!("{} was terminated by a signal", self.command.program),
            }
        };

        Ok(FormatOutcome::Rejected { message })
    }
}

/// Formatter that leaves files untouched, used when formatting is disabled
pub struct NoOpFormatter;

#[async_trait::async_trait]
impl Formatter for NoOpFormatter {
    async fn format(&self, _path: &Path) -> Result<FormatOutcome, ToolError> {
        tracing::debug!("NoOpFormatter: Leaving file unchanged");
        Ok(FormatOutcome::Formatted)
    }
}

/// Factory function to create a formatter from the configured command line
pub fn create_formatter(command_line: &str, timeout: Duration) -> Box<dyn Formatter> {
    match ToolCommand::parse(command_line) {
        Some(command) => {
            tracing::info!("Formatting with `{}` (timeout {:?})", command, timeout);
            Box::new(CommandFormatter::new(command, timeout))
        }
        None => {
            tracing::warn!("Formatting disabled (FORMATTER_COMMAND={:?})", command_line);
            Box::new(NoOpFormatter)
        }
    }
}
