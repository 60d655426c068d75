use crate::services::diff::unified_diff;
use crate::services::formatter::{FormatOutcome, Formatter};
use crate::services::linter::LintRunner;
use crate::services::staging::Staging;
use crate::utils::keyed_mutex::KeyedMutex;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Changes text shown when the formatter could not produce output
pub const NO_CHANGES: &str = "No changes made.";

/// Everything the result page shows for one upload
#[derive(Debug, Clone)]
pub struct Review {
    pub filename: String,
    pub original_code: String,
    pub corrected_code: String,
    pub lint_output: String,
    pub changes: String,
    /// Problems hit along the way that did not abort the review
    pub notices: Vec<String>,
}

/// Drives one upload through staging, linting, formatting and diffing.
pub struct ReviewService {
    staging: Arc<Staging>,
    linter: Arc<dyn LintRunner>,
    formatter: Arc<dyn Formatter>,
    locks: KeyedMutex,
}

impl ReviewService {
    pub fn new(
        staging: Arc<Staging>,
        linter: Arc<dyn LintRunner>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            staging,
            linter,
            formatter,
            locks: KeyedMutex::new(),
        }
    }

    /// Stages `source` under `filename` and produces its review.
    ///
    /// Reviews of the same filename are serialized so the staged original and
    /// corrected files always come from the same run. Tool failures are
    /// reported through [`Review::notices`]; only staging I/O errors fail the call.
    pub async fn review(&self, filename: &str, source: &str) -> Result<Review> {
        let guard = self.locks.lock(filename).await;
        let result = self.review_locked(filename, source).await;
        drop(guard);
        self.locks.cleanup();
        result
    }

    async fn review_locked(&self, filename: &str, source: &str) -> Result<Review> {
        let mut notices = Vec::new();

        let original_path = self
            .staging
            .save_original(filename, source.as_bytes())
            .await?;

        let lint_output = self.run_linter(&original_path, &mut notices).await;
        let (corrected_code, changes) = self.auto_correct(filename, source, &mut notices).await?;

        info!(
            "Reviewed {}: {} lint bytes, {}",
            filename,
            lint_output.len(),
            if changes.is_empty() { "already formatted" } else { "reformatted" }
        );

        Ok(Review {
            filename: filename.to_string(),
            original_code: source.to_string(),
            corrected_code,
            lint_output,
            changes,
            notices,
        })
    }

    async fn run_linter(&self, path: &Path, notices: &mut Vec<String>) -> String {
        match self.linter.lint(path).await {
            Ok(report) => report.text,
            Err(e) => {
                warn!("Linter failed on {}: {}", path.display(), e);
                notices.push(format!("Error running linter: {}", e));
                String::new()
            }
        }
    }

    /// Returns the corrected text and the diff against `original`, or the
    /// empty fallback when the formatter fails.
    async fn auto_correct(
        &self,
        filename: &str,
        original: &str,
        notices: &mut Vec<String>,
    ) -> Result<(String, String)> {
        let corrected_path = self.staging.prepare_corrected(filename).await?;

        let failure = match self.formatter.format(&corrected_path).await {
            Ok(FormatOutcome::Formatted) => None,
            Ok(FormatOutcome::Rejected { message }) => Some(message),
            Err(e) => Some(e.to_string()),
        };

        if let Some(message) = failure {
            warn!("Formatter failed on {}: {}", filename, message.trim_end());
            notices.push(format!("Error correcting code: {}", message.trim_end()));
            self.staging.save_corrected(filename, "").await?;
            return Ok((String::new(), NO_CHANGES.to_string()));
        }

        let corrected = self.staging.read_corrected(filename).await?;
        let changes = unified_diff(original, &corrected);
        Ok((corrected, changes))
    }
}
