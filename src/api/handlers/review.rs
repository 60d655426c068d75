use crate::AppState;
use crate::api::error::AppError;
use crate::api::flash;
use crate::utils::validation::{
    ValidationError, upload_too_large, validate_file_size, validate_filename, validate_text,
};
use crate::views;
use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{Html, Response},
};
use bytes::Bytes;

/// Name of the multipart field carrying the source file
const FILE_FIELD: &str = "file";

struct Upload {
    filename: String,
    data: Bytes,
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let pending = flash::take_notices(&headers, &state.config.secret_key);
    let had_cookie = pending.is_some();
    let notices = pending.unwrap_or_default();
    flash::consume(Html(views::index_page(&notices)), had_cookie)
}

pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let secret = state.config.secret_key.as_str();
    let redirect = |notice: &str| flash::redirect_with_notice(&headers, secret, "/", notice);

    let upload = match multipart {
        Ok(multipart) => match read_upload(multipart).await {
            Ok(upload) => upload,
            // The body limit cuts the stream before the size check can run.
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::warn!("Upload exceeded the body limit: {}", e);
                let notice = describe(&upload_too_large(state.config.max_file_size));
                return Ok(redirect(&notice));
            }
            Err(e) => return Err(AppError::BadRequest(e.body_text())),
        },
        Err(rejection) => {
            tracing::debug!("Upload without multipart body: {}", rejection);
            None
        }
    };

    let Some(upload) = upload else {
        return Ok(redirect("No file part"));
    };

    if upload.filename.is_empty() {
        return Ok(redirect("No selected file"));
    }

    if let Err(e) = validate_filename(&upload.filename) {
        return Ok(redirect(&format!("Invalid filename: {}", describe(&e))));
    }

    if let Err(e) = validate_file_size(upload.data.len(), state.config.max_file_size) {
        return Ok(redirect(&describe(&e)));
    }

    let source = match validate_text(&upload.data) {
        Ok(source) => source,
        Err(e) => return Ok(redirect(&describe(&e))),
    };

    tracing::info!("Reviewing {} ({} bytes)", upload.filename, upload.data.len());
    let review = state.review.review(&upload.filename, source).await?;

    let pending = flash::take_notices(&headers, secret);
    let had_cookie = pending.is_some();
    let pending = pending.unwrap_or_default();

    Ok(flash::consume(
        Html(views::result_page(&review, &pending)),
        had_cookie,
    ))
}

/// Returns the first field named `file` that carries a filename, if any.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A plain form value named `file` is not a file part.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await?;
        return Ok(Some(Upload { filename, data }));
    }
    Ok(None)
}

fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ValidationError>() {
        Some(validation) => validation.message.clone(),
        None => err.to_string(),
    }
}
