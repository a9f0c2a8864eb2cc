//! Scripted collaborators for session tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::models::upload::ResumeFile;
use crate::service_client::{AnalysisService, ServiceError};
use crate::session::reporter::{FailureReporter, SubmissionFailure};

type UploadReply = Result<Value, ServiceError>;

enum Reply {
    Ready(UploadReply),
    Gated(oneshot::Receiver<UploadReply>),
}

/// Records every call and answers uploads from a queue of scripted replies.
/// An empty queue answers with an empty ranking.
#[derive(Default)]
pub struct StubService {
    job_descriptions: Mutex<Vec<String>>,
    uploads: Mutex<Vec<Vec<ResumeFile>>>,
    replies: Mutex<VecDeque<Reply>>,
    reject_job_descriptions: Mutex<bool>,
}

impl StubService {
    pub fn reply(&self, reply: UploadReply) {
        self.replies.lock().unwrap().push_back(Reply::Ready(reply));
    }

    /// Queues a reply that only resolves once the returned sender fires.
    pub fn gated_reply(&self) -> oneshot::Sender<UploadReply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    pub fn reject_job_descriptions(&self) {
        *self.reject_job_descriptions.lock().unwrap() = true;
    }

    pub fn job_descriptions(&self) -> Vec<String> {
        self.job_descriptions.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Vec<ResumeFile>> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisService for StubService {
    async fn upload_job_description(&self, job_description: &str) -> Result<(), ServiceError> {
        self.job_descriptions
            .lock()
            .unwrap()
            .push(job_description.to_string());

        if *self.reject_job_descriptions.lock().unwrap() {
            return Err(ServiceError::Api {
                status: 400,
                message: "Job description cannot be empty.".to_string(),
            });
        }
        Ok(())
    }

    async fn upload_resumes(&self, files: &[ResumeFile]) -> Result<Value, ServiceError> {
        self.uploads.lock().unwrap().push(files.to_vec());
        let reply = self.replies.lock().unwrap().pop_front();

        match reply {
            None => Ok(json!([])),
            Some(Reply::Ready(reply)) => reply,
            Some(Reply::Gated(rx)) => rx.await.unwrap_or_else(|_| {
                Err(ServiceError::Api {
                    status: 599,
                    message: "reply dropped".to_string(),
                })
            }),
        }
    }
}

/// Keeps the rendered message of every reported failure.
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl FailureReporter for RecordingReporter {
    fn report(&self, failure: &SubmissionFailure) {
        self.messages.lock().unwrap().push(failure.to_string());
    }
}
