//! Server-rendered HTML for the upload form and the review page.

use crate::services::review_service::Review;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is in a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

const STYLE: &str = "body{font-family:sans-serif;max-width:70rem;margin:2rem auto;padding:0 1rem}\
pre{background:#f6f8fa;padding:1rem;overflow-x:auto}\
.notice{background:#fff3cd;border:1px solid #ffe69c;padding:.5rem 1rem;margin:.25rem 0;list-style:none}";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Link to the download endpoint for a staged file.
pub fn download_url(filename: &str) -> String {
    format!("/download/{}", utf8_percent_encode(filename, PATH_SEGMENT))
}

fn layout(title: &str, notices: &[String], body: &str) -> String {
    let notices = if notices.is_empty() {
        String::new()
    } else {
        let items: String = notices
            .iter()
            .map(|n| format!("<li class=\"notice\">{}</li>", escape_html(n)))
            .collect();
        format!("<ul class=\"notices\">{}</ul>", items)
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<h1>{title}</h1>\n{notices}\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub fn index_page(notices: &[String]) -> String {
    layout(
        "Lint & Format",
        notices,
        "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
<input type=\"file\" name=\"file\">\n\
<button type=\"submit\">Upload</button>\n\
</form>",
    )
}

fn section(heading: &str, class: &str, content: &str) -> String {
    format!(
        "<h2>{}</h2>\n<pre class=\"{}\">{}</pre>",
        heading,
        class,
        escape_html(content)
    )
}

pub fn result_page(review: &Review, pending: &[String]) -> String {
    let notices: Vec<String> = pending
        .iter()
        .chain(review.notices.iter())
        .cloned()
        .collect();

    let body = [
        section("Original Code", "original", &review.original_code),
        section("Lint Output", "lint", &review.lint_output),
        section("Corrected Code", "corrected", &review.corrected_code),
        section("Changes", "changes", &review.changes),
        format!(
            "<p><a class=\"download\" href=\"{}\">Download corrected {}</a></p>\n\
<p><a href=\"/\">Upload another file</a></p>",
            escape_html(&download_url(&review.filename)),
            escape_html(&review.filename)
        ),
    ]
    .join("\n");

    layout(&format!("Results for {}", review.filename), &notices, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_review() -> Review {
        Review {
            filename: "my <file>.py".to_string(),
            original_code: "if a < b:\n    pass\n".to_string(),
            corrected_code: "x = 1\n".to_string(),
            lint_output: "W0611: Unused import os\n".to_string(),
            changes: "--- Original\n+++ Corrected\n".to_string(),
            notices: vec!["Error correcting code: boom".to_string()],
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_download_url_is_encoded() {
        assert_eq!(download_url("main.py"), "/download/main.py");
        assert_eq!(download_url("my file.py"), "/download/my%20file.py");
        assert_eq!(download_url("é.py"), "/download/%C3%A9.py");
    }

    #[test]
    fn test_index_page_lists_notices() {
        let page = index_page(&["No selected file".to_string()]);
        assert!(page.contains("name=\"file\""));
        assert!(page.contains("<li class=\"notice\">No selected file</li>"));

        assert!(!index_page(&[]).contains("class=\"notices\""));
    }

    #[test]
    fn test_result_page_escapes_content() {
        let page = result_page(&sample_review(), &["earlier".to_string()]);

        assert!(page.contains("if a &lt; b:"));
        assert!(page.contains("W0611: Unused import os"));
        assert!(page.contains("--- Original\n+++ Corrected\n"));
        assert!(page.contains("href=\"/download/my%20%3Cfile%3E.py\""));
        assert!(page.contains("Results for my &lt;file&gt;.py"));

        let earlier = page.find("earlier").unwrap();
        let boom = page.find("Error correcting code: boom").unwrap();
        assert!(earlier < boom);
    }
}
