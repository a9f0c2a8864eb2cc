use std::sync::Arc;

use crate::config::Config;
use crate::session::controller::SubmissionController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one user session this process serves.
    pub session: Arc<SubmissionController>,
    pub config: Config,
}
