use similar::TextDiff;

pub const ORIGINAL_LABEL: &str = "Original";
pub const CORRECTED_LABEL: &str = "Corrected";

/// Lines of unchanged context around each hunk
const CONTEXT_LINES: usize = 3;

/// Renders a unified line diff from `original` to `corrected`.
///
/// Returns an empty string when the inputs are identical; headers are only
/// written in front of the first hunk.
pub fn unified_diff(original: &str, corrected: &str) -> String {
    if original == corrected {
        return String::new();
    }

    TextDiff::from_lines(original, corrected)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(ORIGINAL_LABEL, CORRECTED_LABEL)
        .to_string()
}
