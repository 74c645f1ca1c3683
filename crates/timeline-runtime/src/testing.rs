//! Scripted in-memory backend for runtime tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use timeline_core::{Result, TimelineError};

use crate::client::{JobBackend, JobStatus, JobStatusReport};
use crate::response::CaptureFetch;

/// Serves queued answers in order. Once the status queue runs dry every
/// poll answers `PENDING`.
pub(crate) struct ScriptedBackend {
    start: Mutex<Option<Result<String>>>,
    statuses: Mutex<VecDeque<Result<JobStatusReport>>>,
    fetch: Mutex<Option<Result<CaptureFetch>>>,
    status_calls: AtomicU32,
    fetch_calls: AtomicU32,
}

impl ScriptedBackend {
    pub(crate) fn with_statuses(statuses: Vec<Result<JobStatusReport>>) -> Self {
        Self {
            start: Mutex::new(Some(Ok("job-1".to_string()))),
            statuses: Mutex::new(statuses.into()),
            fetch: Mutex::new(Some(Ok(CaptureFetch::Empty))),
            status_calls: AtomicU32::new(0),
            fetch_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn start_with(self, start: Result<String>) -> Self {
        *self.start.lock().unwrap() = Some(start);
        self
    }

    pub(crate) fn fetch_with(self, fetch: Result<CaptureFetch>) -> Self {
        *self.fetch.lock().unwrap() = Some(fetch);
        self
    }

    pub(crate) fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn start_job(&self, _url: &str, _year: u16) -> Result<String> {
        self.start
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(TimelineError::StartRejected))
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(JobStatusReport {
                status: JobStatus::Pending,
                duration: None,
            }))
    }

    async fn fetch_captures(&self, _url: &str, _year: u16) -> Result<CaptureFetch> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(CaptureFetch::Empty))
    }
}
