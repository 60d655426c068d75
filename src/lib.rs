pub mod api;
pub mod config;
pub mod services;
pub mod utils;
pub mod views;

use crate::config::AppConfig;
use crate::services::formatter::{Formatter, create_formatter};
use crate::services::linter::{LintRunner, create_linter};
use crate::services::review_service::ReviewService;
use crate::services::staging::Staging;
use axum::{Router, extract::DefaultBodyLimit, middleware::from_fn, routing::get};
use std::sync::Arc;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub staging: Arc<Staging>,
    pub review: Arc<ReviewService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        linter: Arc<dyn LintRunner>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        let staging = Arc::new(Staging::from_config(&config));
        let review = Arc::new(ReviewService::new(staging.clone(), linter, formatter));
        Self {
            config,
            staging,
            review,
        }
    }

    /// Builds the external-process linter and formatter named in `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let linter = create_linter(&config.linter_command, config.tool_timeout);
        let formatter = create_formatter(&config.formatter_command, config.tool_timeout);
        Self::new(config, linter.into(), formatter.into())
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(api::handlers::review::index).post(api::handlers::review::upload_file),
        )
        .route(
            "/download/:filename",
            get(api::handlers::download::download_file),
        )
        .route(
            "/xdownload/:filename",
            get(api::handlers::download::xdownload_file),
        )
        .route("/health", get(api::handlers::health::health_check))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(DefaultBodyLimit::max(
            state.config.max_file_size + MULTIPART_OVERHEAD,
        ))
        .with_state(state)
}
