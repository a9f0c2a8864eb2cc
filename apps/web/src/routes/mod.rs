pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(handlers::handle_page))
        .route("/job-description", post(handlers::handle_job_description))
        .route(
            "/resumes",
            post(handlers::handle_resumes).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/results", get(handlers::handle_results_fragment))
        .route("/api/results", get(handlers::handle_results))
        .with_state(state)
}
