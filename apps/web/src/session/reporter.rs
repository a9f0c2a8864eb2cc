//! Failure reporting for submissions.
//!
//! Failed submissions are never shown to the user. They are handed to a
//! `FailureReporter` instead; the default writes them to the operational log.

use thiserror::Error;
use tracing::{debug, error};

use crate::service_client::ServiceError;

/// Everything a submission can fail with, as seen by the reporter.
#[derive(Debug, Error)]
pub enum SubmissionFailure {
    #[error("No resume files selected; upload skipped")]
    NoFilesSelected,

    #[error("Resume upload could not be read: {0}")]
    UnreadableUpload(String),

    #[error("Job description submission failed: {0}")]
    JobDescription(#[source] ServiceError),

    #[error("Resume upload #{generation} failed: {error}")]
    Resumes {
        generation: u64,
        #[source]
        error: ServiceError,
    },
}

/// Where submission failures go. Carried by the controller as `Arc<dyn FailureReporter>`.
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: &SubmissionFailure);
}

/// Default reporter: log and move on.
pub struct LogReporter;

impl FailureReporter for LogReporter {
    fn report(&self, failure: &SubmissionFailure) {
        match failure {
            // Nothing was sent; not an operational problem.
            SubmissionFailure::NoFilesSelected => debug!("{failure}"),
            _ => error!("{failure}"),
        }
    }
}
