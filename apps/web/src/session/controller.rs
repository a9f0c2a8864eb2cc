//! Submission Controller — turns user input into service requests and keeps the
//! latest ranked results.
//!
//! One controller is one session. It lives for the lifetime of the process and
//! nothing it holds is persisted.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::ranking::RankedResultSet;
use crate::models::upload::ResumeFile;
use crate::service_client::AnalysisService;
use crate::session::reporter::{FailureReporter, SubmissionFailure};

// ────────────────────────────────────────────────────────────────────────────
// Ordering policy
// ────────────────────────────────────────────────────────────────────────────

/// Decides which upload response ends up displayed when several are in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadOrdering {
    /// Every successful response is applied as it resolves; the last one to
    /// resolve wins regardless of issue order.
    #[default]
    LastResolved,
    /// A response is applied only if it was issued after the one on display.
    LatestIssued,
}

impl FromStr for UploadOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-resolved" => Ok(Self::LastResolved),
            "latest-issued" => Ok(Self::LatestIssued),
            other => Err(format!(
                "unknown upload ordering '{other}' (expected 'last-resolved' or 'latest-issued')"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcomes and snapshots
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDescriptionOutcome {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing selected; no request was issued.
    Skipped,
    Applied { generation: u64, entries: usize },
    /// The response arrived after a newer one was applied (`LatestIssued` only).
    Superseded { generation: u64, current: u64 },
    Failed { generation: u64 },
}

/// The result set on display plus where it came from. Generation 0 means no
/// upload response has been applied yet.
#[derive(Debug, Clone, Default)]
pub struct ResultSnapshot {
    pub generation: u64,
    pub received_at: Option<DateTime<Utc>>,
    pub results: Arc<RankedResultSet>,
}

struct SessionState {
    job_description: String,
    selection: Option<Vec<ResumeFile>>,
    results: ResultSnapshot,
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

pub struct SubmissionController {
    service: Arc<dyn AnalysisService>,
    reporter: Arc<dyn FailureReporter>,
    ordering: UploadOrdering,
    last_issued: AtomicU64,
    state: Mutex<SessionState>,
}

impl SubmissionController {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        reporter: Arc<dyn FailureReporter>,
        ordering: UploadOrdering,
    ) -> Self {
        Self {
            service,
            reporter,
            ordering,
            last_issued: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                job_description: String::new(),
                selection: None,
                results: ResultSnapshot::default(),
            }),
        }
    }

    /// The lock is never held across an `.await`.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_job_description(&self, text: impl Into<String>) {
        self.state().job_description = text.into();
    }

    pub fn job_description(&self) -> String {
        self.state().job_description.clone()
    }

    /// Replaces the selection wholesale. Duplicates are kept.
    pub fn select_files(&self, files: Vec<ResumeFile>) {
        debug!("Resume selection replaced ({} files)", files.len());
        self.state().selection = Some(files);
    }

    pub fn selection_len(&self) -> usize {
        self.state().selection.as_ref().map_or(0, Vec::len)
    }

    pub fn results(&self) -> ResultSnapshot {
        self.state().results.clone()
    }

    /// Reports an upload whose body could not be read. Selection and results
    /// stay as they were.
    pub fn reject_upload(&self, reason: impl Into<String>) {
        self.reporter
            .report(&SubmissionFailure::UnreadableUpload(reason.into()));
    }

    /// Sends the current job description. Fire-and-forget: failures are reported,
    /// never retried, and the held text is left as it was either way.
    pub async fn submit_job_description(&self) -> JobDescriptionOutcome {
        let text = self.job_description();

        match self.service.upload_job_description(&text).await {
            Ok(()) => {
                info!("Job description submitted ({} chars)", text.chars().count());
                JobDescriptionOutcome::Sent
            }
            Err(e) => {
                self.reporter.report(&SubmissionFailure::JobDescription(e));
                JobDescriptionOutcome::Failed
            }
        }
    }

    /// Uploads the current selection in one request and, on success, replaces
    /// the displayed results with the response.
    ///
    /// An absent or empty selection is a silent no-op. Calls made while another
    /// upload is in flight proceed independently; nothing is cancelled.
    pub async fn submit_resumes(&self) -> UploadOutcome {
        let files = match self.current_selection() {
            Some(files) if !files.is_empty() => files,
            _ => {
                self.reporter.report(&SubmissionFailure::NoFilesSelected);
                return UploadOutcome::Skipped;
            }
        };

        let generation = self.last_issued.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Upload #{generation} issued with {} files", files.len());

        match self.service.upload_resumes(&files).await {
            Ok(payload) => self.apply(generation, RankedResultSet::from_payload(&payload)),
            Err(error) => {
                self.reporter
                    .report(&SubmissionFailure::Resumes { generation, error });
                UploadOutcome::Failed { generation }
            }
        }
    }

    fn current_selection(&self) -> Option<Vec<ResumeFile>> {
        self.state().selection.clone()
    }

    fn apply(&self, generation: u64, results: RankedResultSet) -> UploadOutcome {
        let mut state = self.state();
        let current = state.results.generation;

        if self.ordering == UploadOrdering::LatestIssued && generation <= current {
            debug!("Upload #{generation} superseded by #{current}; response dropped");
            return UploadOutcome::Superseded {
                generation,
                current,
            };
        }

        let entries = results.len();
        state.results = ResultSnapshot {
            generation,
            received_at: Some(Utc::now()),
            results: Arc::new(results),
        };

        info!("Ranked results replaced by upload #{generation} ({entries} entries)");
        UploadOutcome::Applied {
            generation,
            entries,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
