use crate::AppState;
use crate::api::error::AppError;
use crate::utils::validation::validate_filename;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::io::ReaderStream;

/// RFC 5987 `attr-char` set for the `filename*` parameter
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Sends a corrected file as an attachment and tells clients and proxies
/// not to cache it, so a re-upload is always picked up.
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let mut response = send_corrected(&state, &filename).await?;

    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));

    Ok(response)
}

/// Same transfer as [`download_file`], without the cache headers.
pub async fn xdownload_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    send_corrected(&state, &filename).await
}

async fn send_corrected(state: &AppState, filename: &str) -> Result<Response, AppError> {
    if validate_filename(filename).is_err() {
        tracing::debug!("Rejected download name {:?}", filename);
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let (file, len) = state
        .staging
        .open_corrected(filename)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(filename)),
        (header::CONTENT_LENGTH, len.to_string()),
    ];

    Ok((headers, body).into_response())
}

fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() && c != '"' && c != '\\' { c } else { '_' })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}
