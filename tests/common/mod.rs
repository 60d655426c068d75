#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
};
use code_corrector::config::AppConfig;
use code_corrector::services::formatter::{FormatOutcome, Formatter};
use code_corrector::services::linter::{LintReport, LintRunner};
use code_corrector::services::tools::ToolError;
use code_corrector::{AppState, create_app};
use http_body_util::BodyExt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";
pub const SECRET: &str = "test_secret_for_review_tests";

/// Flags `import os` the way pylint words it.
pub struct MockLinter;

#[async_trait]
impl LintRunner for MockLinter {
    async fn lint(&self, path: &Path) -> Result<LintReport, ToolError> {
        let source = tokio::fs::read_to_string(path).await.unwrap_or_default();
        let name = path.file_name().unwrap().to_string_lossy();
        let text = source
            .lines()
            .enumerate()
            .filter(|(_, line)| line.trim() == "import os")
            .map(|(i, _)| format!("{}:{}:0: W0611: Unused import os (unused-import)\n", name, i + 1))
            .collect::<String>();
        let exit_code = if text.is_empty() { 0 } else { 4 };
        Ok(LintReport {
            text,
            exit_code: Some(exit_code),
        })
    }
}

/// Puts spaces around `=` in `x=1`; refuses files containing `syntax error`.
pub struct MockFormatter;

#[async_trait]
impl Formatter for MockFormatter {
    async fn format(&self, path: &Path) -> Result<FormatOutcome, ToolError> {
        let source = tokio::fs::read_to_string(path).await.unwrap();
        if source.contains("syntax error") {
            return Ok(FormatOutcome::Rejected {
                message: "error: cannot format: Cannot parse".to_string(),
            });
        }
        tokio::fs::write(path, source.replace("x=1", "x = 1"))
            .await
            .unwrap();
        Ok(FormatOutcome::Formatted)
    }
}

pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_tools(Arc::new(MockLinter), Arc::new(MockFormatter), |_| {}).await
    }

    pub async fn with_tools(
        linter: Arc<dyn LintRunner>,
        formatter: Arc<dyn Formatter>,
        customize: impl FnOnce(&mut AppConfig),
    ) -> Self {
        let _ = tracing_subscriber::fmt::try_init();
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::with_root(dir.path());
        config.secret_key = SECRET.to_string();
        customize(&mut config);

        let state = AppState::new(config, linter, formatter);
        state.staging.ensure_dirs().await.unwrap();
        Self { dir, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        create_app(self.state.clone()).oneshot(request).await.unwrap()
    }

    pub async fn upload(&self, filename: &str, content: &[u8]) -> Response<Body> {
        self.send(upload_request(filename, content)).await
    }

    pub fn uploads(&self) -> Vec<String> {
        list(&self.dir.path().join("uploads"))
    }

    pub fn corrected(&self) -> Vec<String> {
        list(&self.dir.path().join("corrected"))
    }

    pub fn read_upload(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join("uploads").join(name)).unwrap()
    }

    pub fn read_corrected(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join("corrected").join(name)).unwrap()
    }
}

fn list(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn multipart_request(parts: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(parts.to_vec()))
        .unwrap()
}

pub fn file_part(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut part = format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
        Content-Type: text/x-python\r\n\r\n",
        boundary = BOUNDARY,
        filename = filename,
    )
    .into_bytes();
    part.extend_from_slice(content);
    part.extend_from_slice(b"\r\n");
    part
}

pub fn text_part(name: &str, value: &str) -> Vec<u8> {
    format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"{name}\"\r\n\r\n\
        {value}\r\n",
        boundary = BOUNDARY,
    )
    .into_bytes()
}

pub fn closing() -> Vec<u8> {
    format!("--{}--\r\n", BOUNDARY).into_bytes()
}

pub fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = file_part(filename, content);
    body.extend(closing());
    multipart_request(&body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `flash=...` pair from a `Set-Cookie` header, ready to send back.
pub fn flash_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get("set-cookie")
        .expect("notice cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}
