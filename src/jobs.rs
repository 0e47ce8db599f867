//! Asynchronous scan jobs: identity, lifecycle state, and the one-shot
//! execution task that drives the executor and the result forwarder.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ForwardError;
use crate::executor::ScanExecutor;
use crate::forwarder::ResultForwarder;
use crate::types::SubmitRequest;

/// Status rendering returned for ids the store has never seen.
pub const UNKNOWN_SCAN_ID: &str = "UNKNOWN_SCAN_ID";

/// Lifecycle state of one scan job. A job starts `InProgress` and is moved
/// exactly once to a terminal state by its execution task; the only later
/// rewrite is `Completed` being superseded when result forwarding fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    InProgress,
    Completed(String),
    Error(String),
    Exception(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::InProgress)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::InProgress => write!(f, "IN_PROGRESS"),
            JobStatus::Completed(payload) => write!(f, "COMPLETED: {payload}"),
            JobStatus::Error(details) => write!(f, "ERROR: {details}"),
            JobStatus::Exception(msg) => write!(f, "EXCEPTION: {msg}"),
        }
    }
}

/// Process-wide store of job statuses, keyed by job id.
///
/// Writes replace the whole status value under the write lock, so readers
/// observe either the initial `InProgress` or a fully-written terminal
/// value, never a torn one. Entries are never evicted; memory grows with
/// job count for the process lifetime.
#[derive(Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, id: &str, status: JobStatus) {
        self.inner.write().await.insert(id.to_string(), status);
    }

    pub async fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().await.get(id).cloned()
    }

    /// Status string for `id`, or the unknown-id sentinel. A miss is a
    /// lookup outcome, not an error.
    pub async fn render(&self, id: &str) -> String {
        match self.inner.read().await.get(id) {
            Some(status) => status.to_string(),
            None => UNKNOWN_SCAN_ID.to_string(),
        }
    }
}

/// Owns the status store and schedules one execution task per submission.
pub struct JobManager {
    store: JobStore,
    executor: Arc<dyn ScanExecutor>,
    forwarder: ResultForwarder,
}

impl JobManager {
    pub fn new(executor: Arc<dyn ScanExecutor>, forwarder: ResultForwarder) -> Self {
        Self {
            store: JobStore::new(),
            executor,
            forwarder,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Allocate a fresh job id, mark it `IN_PROGRESS`, and schedule the
    /// execution task. Returns the id without waiting on any scan, process,
    /// or network I/O.
    pub async fn submit(&self, request: SubmitRequest) -> String {
        let id = Uuid::new_v4().to_string();
        self.store.put(&id, JobStatus::InProgress).await;

        let store = self.store.clone();
        let executor = self.executor.clone();
        let forwarder = self.forwarder.clone();
        let job_id = id.clone();
        tokio::spawn(async move {
            execute_job(store, executor, forwarder, request, job_id).await;
        });

        id
    }

    /// Current status string for `id`, or [`UNKNOWN_SCAN_ID`].
    pub async fn status(&self, id: &str) -> String {
        self.store.render(id).await
    }
}

/// Runs exactly once per job. Every failure is flattened into the status
/// store; nothing propagates back to the submission path.
async fn execute_job(
    store: JobStore,
    executor: Arc<dyn ScanExecutor>,
    forwarder: ResultForwarder,
    request: SubmitRequest,
    job_id: String,
) {
    tracing::info!(job_id = %job_id, report_id = request.report_id, "executing scan job");

    let out = match executor.run(request.report_id, &request.option).await {
        Ok(out) => out,
        Err(err) => {
            tracing::error!(job_id = %job_id, error = %err, "scan execution failed");
            store.put(&job_id, JobStatus::Exception(format!("{err:#}"))).await;
            return;
        }
    };

    if !out.succeeded() {
        tracing::error!(job_id = %job_id, exit_code = out.exit_code, "scan exited non-zero");
        store
            .put(
                &job_id,
                JobStatus::Error(format!("exit code {} - {}", out.exit_code, out.output)),
            )
            .await;
        return;
    }

    tracing::info!(job_id = %job_id, "scan completed");
    store.put(&job_id, JobStatus::Completed(out.output.clone())).await;

    // Delivery failure is user-visible as a job failure even though the scan
    // itself succeeded; the diagnostic keeps the two cases distinguishable.
    match forwarder.forward(&out.output).await {
        Ok(_) => {}
        Err(err @ ForwardError::Parse(_)) => {
            tracing::error!(job_id = %job_id, error = %err, "scan output failed to parse");
            store.put(&job_id, JobStatus::Exception(err.to_string())).await;
        }
        Err(err) => {
            tracing::error!(job_id = %job_id, error = %err, "result delivery failed");
            store.put(&job_id, JobStatus::Error(err.to_string())).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_terminal() {
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(JobStatus::Completed(String::new()).is_terminal());
        assert!(JobStatus::Error(String::new()).is_terminal());
        assert!(JobStatus::Exception(String::new()).is_terminal());
    }

    #[test]
    fn status_strings_have_stable_prefixes() {
        assert_eq!(JobStatus::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!(
            JobStatus::Completed("out".into()).to_string(),
            "COMPLETED: out"
        );
        assert!(JobStatus::Error("boom".into()).to_string().starts_with("ERROR:"));
        assert!(JobStatus::Exception("io".into()).to_string().starts_with("EXCEPTION:"));
    }

    #[tokio::test]
    async fn store_miss_returns_sentinel() {
        let store = JobStore::new();
        assert_eq!(store.render("nonexistent").await, UNKNOWN_SCAN_ID);
    }
}
