use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub linter: String,
    pub formatter: String,
    pub staging: String,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let staging_ready =
        state.staging.upload_dir().is_dir() && state.staging.corrected_dir().is_dir();

    Json(HealthResponse {
        status: if staging_ready { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        linter: state.config.linter_command.clone(),
        formatter: state.config.formatter_command.clone(),
        staging: if staging_ready { "ready" } else { "missing" }.to_string(),
    })
}
