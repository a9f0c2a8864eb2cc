mod config;
mod errors;
mod models;
mod render;
mod routes;
mod service_client;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::service_client::HttpAnalysisService;
use crate::session::controller::SubmissionController;
use crate::session::reporter::LogReporter;
use crate::state::AppState;

// One session, one thread: handlers and service calls interleave cooperatively.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("ranker_web={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ranker-web v{}", env!("CARGO_PKG_VERSION"));

    // Initialize analysis service client
    let service = HttpAnalysisService::new(config.service_url.clone(), config.request_timeout)?;
    info!("Analysis service client initialized ({})", service.base_url());

    let session = SubmissionController::new(
        Arc::new(service),
        Arc::new(LogReporter),
        config.upload_ordering,
    );
    info!("Session ready (upload ordering: {:?})", config.upload_ordering);

    // Build app state
    let state = AppState {
        session: Arc::new(session),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
