//! Axum route handlers for the page and its two forms.
//!
//! Form submissions always redirect back to the page, whatever the analysis
//! service answered. Failures only show up in the log.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::models::ranking::RankedResultSet;
use crate::models::upload::ResumeFile;
use crate::render::page::render_page;
use crate::render::results::{build_rows, render_html, render_text, ResultRow};
use crate::service_client::FILES_FIELD;
use crate::session::controller::UploadOutcome;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobDescriptionForm {
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub generation: u64,
    pub received_at: Option<DateTime<Utc>>,
    pub entries: RankedResultSet,
    pub rows: Vec<ResultRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(render_page(&state.session)?))
}

/// POST /job-description
///
/// Stores the text and submits it. The text is kept for the next page render.
pub async fn handle_job_description(
    State(state): State<AppState>,
    Form(form): Form<JobDescriptionForm>,
) -> Redirect {
    state.session.set_job_description(form.job_description);
    state.session.submit_job_description().await;
    Redirect::to("/")
}

/// POST /resumes
///
/// The uploaded parts become the new selection, which is then submitted.
/// A form posted with nothing selected yields an empty selection and no request.
/// A body that cannot be read (too large, not multipart, truncated) is reported
/// and leaves the selection and results as they were.
pub async fn handle_resumes(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Redirect {
    let files = match multipart {
        Ok(multipart) => read_resume_parts(multipart).await,
        Err(rejection) => Err(format!("Not a multipart upload: {rejection}")),
    };

    match files {
        Ok(files) => {
            state.session.select_files(files);
            if let UploadOutcome::Applied { .. } = state.session.submit_resumes().await {
                debug!("Ranking table:\n{}", render_text(&state.session.results().results));
            }
        }
        Err(reason) => state.session.reject_upload(reason),
    }

    Redirect::to("/")
}

/// GET /results
///
/// Only the results section, for clients that refresh it in place.
pub async fn handle_results_fragment(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    Ok(Html(render_html(&state.session.results().results)?))
}

/// GET /api/results
pub async fn handle_results(State(state): State<AppState>) -> Json<ResultsResponse> {
    let snapshot = state.session.results();

    Json(ResultsResponse {
        generation: snapshot.generation,
        received_at: snapshot.received_at,
        rows: build_rows(&snapshot.results),
        entries: snapshot.results.as_ref().clone(),
    })
}

/// Collects the `files` parts in order. Browsers send one part with an empty
/// file name when no file was chosen; those parts are skipped.
async fn read_resume_parts(mut multipart: Multipart) -> Result<Vec<ResumeFile>, String> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Malformed upload: {e}"))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to read '{file_name}': {e}"))?;

        let mut file = ResumeFile::new(file_name, bytes);
        if let Some(content_type) = content_type {
            file = file.with_content_type(content_type);
        }
        files.push(file);
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use reqwest::{multipart, redirect::Policy, StatusCode};
    use serde_json::{json, Value};

    use crate::config::Config;
    use crate::routes::build_router;
    use crate::session::controller::{SubmissionController, UploadOrdering};
    use crate::session::testing::{RecordingReporter, StubService};

    struct Harness {
        base_url: String,
        client: reqwest::Client,
        session: Arc<SubmissionController>,
        service: Arc<StubService>,
        reporter: Arc<RecordingReporter>,
    }

    async fn harness() -> Harness {
        let service = Arc::new(StubService::default());
        let reporter = Arc::new(RecordingReporter::default());
        let session = Arc::new(SubmissionController::new(
            service.clone(),
            reporter.clone(),
            UploadOrdering::default(),
        ));
        let state = AppState {
            session: session.clone(),
            config: Config {
                service_url: "http://analysis.test".to_string(),
                port: 0,
                rust_log: "debug".to_string(),
                upload_ordering: UploadOrdering::default(),
                request_timeout: None,
                max_upload_bytes: 1024 * 1024,
            },
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Harness {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::builder()
                .redirect(Policy::none())
                .build()
                .unwrap(),
            session,
            service,
            reporter,
        }
    }

    fn file_part(name: &str, bytes: &[u8]) -> multipart::Part {
        multipart::Part::bytes(bytes.to_vec()).file_name(name.to_string())
    }

    async fn get_results(h: &Harness) -> Value {
        h.client
            .get(format!("{}/api/results", h.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_form_forwards_files_in_order_and_redirects() {
        let h = harness().await;
        h.service
            .reply(Ok(json!([{"name": "bob.pdf", "score": 80, "skills": ["Go"]}])));

        let form = multipart::Form::new()
            .part("files", file_part("alice.pdf", b"alice"))
            .part("files", file_part("bob.pdf", b"bob"));
        let response = h
            .client
            .post(format!("{}/resumes", h.base_url))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");

        let uploads = h.service.uploads();
        assert_eq!(uploads.len(), 1);
        let names: Vec<_> = uploads[0].iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["alice.pdf", "bob.pdf"]);
        assert_eq!(uploads[0][0].bytes.as_ref(), b"alice");

        let results = get_results(&h).await;
        assert_eq!(results["generation"], 1);
        assert_eq!(results["entries"][0]["name"], "bob.pdf");
        assert_eq!(results["rows"][0]["skills"], "Go");
        assert_eq!(results["rows"][0]["experience"], "N/A");
    }

    #[tokio::test]
    async fn test_upload_form_with_nothing_selected_sends_nothing() {
        let h = harness().await;

        let form = multipart::Form::new().part("files", file_part("", b""));
        let response = h
            .client
            .post(format!("{}/resumes", h.base_url))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(h.service.uploads().is_empty());
        assert_eq!(get_results(&h).await["generation"], 0);
    }

    #[tokio::test]
    async fn test_failed_upload_still_redirects() {
        let h = harness().await;
        h.service.reply(Err(crate::service_client::ServiceError::Api {
            status: 500,
            message: "scoring crashed".to_string(),
        }));

        let form = multipart::Form::new().part("files", file_part("a.pdf", b"a"));
        let response = h
            .client
            .post(format!("{}/resumes", h.base_url))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(h.reporter.messages().len(), 1);
        assert_eq!(get_results(&h).await["entries"], json!([]));
    }

    #[tokio::test]
    async fn test_oversized_upload_redirects_and_keeps_previous_state() {
        let h = harness().await;
        h.service
            .reply(Ok(json!([{"name": "small.pdf", "score": 70}])));
        let form = multipart::Form::new().part("files", file_part("small.pdf", b"small"));
        h.client
            .post(format!("{}/resumes", h.base_url))
            .multipart(form)
            .send()
            .await
            .unwrap();

        let big = vec![0u8; 2 * 1024 * 1024];
        let form = multipart::Form::new().part("files", file_part("big.pdf", &big));
        let response = h
            .client
            .post(format!("{}/resumes", h.base_url))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
        assert_eq!(h.service.uploads().len(), 1);
        let messages = h.reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Resume upload could not be read"));
        assert_eq!(h.session.selection_len(), 1);

        let results = get_results(&h).await;
        assert_eq!(results["generation"], 1);
        assert_eq!(results["entries"][0]["name"], "small.pdf");
    }

    #[tokio::test]
    async fn test_non_multipart_upload_redirects() {
        let h = harness().await;

        let response = h
            .client
            .post(format!("{}/resumes", h.base_url))
            .header("content-type", "text/plain")
            .body("not a form")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(h.service.uploads().is_empty());
        let messages = h.reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Not a multipart upload"));
    }

    #[tokio::test]
    async fn test_job_description_form_submits_and_keeps_text() {
        let h = harness().await;

        let response = h
            .client
            .post(format!("{}/job-description", h.base_url))
            .form(&[("job_description", "Rust & distributed systems")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            h.service.job_descriptions(),
            vec!["Rust & distributed systems".to_string()]
        );

        let page = h
            .client
            .get(format!("{}/", h.base_url))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("Rust &amp; distributed systems"));
    }

    #[tokio::test]
    async fn test_rejected_job_description_is_invisible_to_user() {
        let h = harness().await;
        h.service.reject_job_descriptions();

        let response = h
            .client
            .post(format!("{}/job-description", h.base_url))
            .form(&[("job_description", "")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(h.reporter.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_results_fragment_starts_with_placeholder() {
        let h = harness().await;
        let html = h
            .client
            .get(format!("{}/results", h.base_url))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(html.contains("No resumes ranked yet."));
        assert!(!html.contains("<table"));
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness().await;
        let body: Value = h
            .client
            .get(format!("{}/health", h.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "ranker-web");
        assert_eq!(body["analysis_service"], "http://analysis.test");
    }
}
