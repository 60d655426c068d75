use crate::services::tools::{ToolCommand, ToolError};
use std::path::Path;
use std::time::Duration;

/// Output of a lint run: stdout followed by stderr, exactly as the tool printed it.
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub text: String,
    /// The linter's own exit status. Linters exit non-zero when they find
    /// something, so this is informational only.
    pub exit_code: Option<i32>,
}

/// Trait for static-analysis implementations
#[async_trait::async_trait]
pub trait LintRunner: Send + Sync {
    /// Lint the file at `path`
    async fn lint(&self, path: &Path) -> Result<LintReport, ToolError>;
}

/// Linter backed by an external process (`pylint <path>` by default).
pub struct CommandLinter {
    command: ToolCommand,
    timeout: Duration,
}

impl CommandLinter {
    pub fn new(command: ToolCommand, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

#[async_trait::async_trait]
impl LintRunner for CommandLinter {
    async fn lint(&self, path: &Path) -> Result<LintReport, ToolError> {
        let output = self.command.run(path, self.timeout).await?;

        if !output.success {
            tracing::debug!(
                "{} reported findings for {} (exit {:?})",
                self.command.program,
                path.display(),
                output.exit_code
            );
        }

        let mut text = output.stdout;
        text.push_str(&output.stderr);

        Ok(LintReport {
            text,
            exit_code: output.exit_code,
        })
    }
}

/// Linter that reports nothing, used when linting is disabled
pub struct NoOpLinter;

#[async_trait::async_trait]
impl LintRunner for NoOpLinter {
    async fn lint(&self, _path: &Path) -> Result<LintReport, ToolError> {
        tracing::debug!("NoOpLinter: Skipping lint");
        Ok(LintReport::default())
    }
}

/// Factory function to create a linter from the configured command line
pub fn create_linter(command_line: &str, timeout: Duration) -> Box<dyn LintRunner> {
    match ToolCommand::parse(command_line) {
        Some(command) => {
            tracing::info!("Linting with `{}` (timeout {:?})", command, timeout);
            Box::new(CommandLinter::new(command, timeout))
        }
        None => {
            tracing::warn!("Linting disabled (LINTER_COMMAND={:?})", command_line);
            Box::new(NoOpLinter)
        }
    }
}
