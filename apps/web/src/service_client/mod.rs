//! Analysis service client — the single point of entry for calls to the remote
//! resume ranking service.
//!
//! ARCHITECTURAL RULE: No other module may issue HTTP requests to the service.
//! The session talks to it through the `AnalysisService` trait so tests can swap
//! in scripted fakes.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::upload::ResumeFile;

/// Where the analysis service listens unless `SERVICE_URL` says otherwise.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
const JOB_DESCRIPTION_PATH: &str = "/upload-job-description";
const RESUMES_PATH: &str = "/upload-resumes";
/// Multipart field name shared by every uploaded resume part.
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid part for '{file_name}': {reason}")]
    InvalidPart { file_name: String, reason: String },
}

/// The two operations the remote service offers this client.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Sends the job description. The response body carries nothing the client uses.
    async fn upload_job_description(&self, job_description: &str) -> Result<(), ServiceError>;

    /// Sends every file in one multipart request and returns the raw JSON body.
    async fn upload_resumes(&self, files: &[ResumeFile]) -> Result<Value, ServiceError>;
}

#[derive(Debug, Serialize)]
struct JobDescriptionRequest<'a> {
    job_description: &'a str,
}

/// The service reports failures as `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: String,
}

/// reqwest-backed implementation of `AnalysisService`.
#[derive(Clone)]
pub struct HttpAnalysisService {
    client: Client,
    base_url: String,
}

impl HttpAnalysisService {
    /// No timeout is applied unless one is given; a hung request simply stays pending.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn upload_job_description(&self, job_description: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.url(JOB_DESCRIPTION_PATH))
            .json(&JobDescriptionRequest { job_description })
            .send()
            .await?;

        ensure_success(response).await?;
        debug!("Job description accepted ({} bytes)", job_description.len());
        Ok(())
    }

    async fn upload_resumes(&self, files: &[ResumeFile]) -> Result<Value, ServiceError> {
        let form = build_form(files)?;

        let response = self
            .client
            .post(self.url(RESUMES_PATH))
            .multipart(form)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body)?;

        debug!(
            "Resume upload answered: {} parts sent, {} bytes received",
            files.len(),
            body.len()
        );
        Ok(payload)
    }
}

/// One part per file, all under `FILES_FIELD`, in input order.
fn build_form(files: &[ResumeFile]) -> Result<multipart::Form, ServiceError> {
    let mut form = multipart::Form::new();

    for file in files {
        let mut part = multipart::Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ServiceError::InvalidPart {
                    file_name: file.file_name.clone(),
                    reason: e.to_string(),
                })?;
        }
        form = form.part(FILES_FIELD, part);
    }

    Ok(form)
}

async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    // Try to parse error message
    let message = serde_json::from_str::<ServiceErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    Err(ServiceError::Api {
        status: status.as_u16(),
        message,
    })
}
