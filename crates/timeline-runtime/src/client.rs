//! HTTP client for the fingerprint job backend.
//!
//! The backend exposes three GET endpoints: `/calculate-simhash` starts a
//! job, `/job` reports its status, and `/simhash` returns the captures once
//! the job has succeeded. [`JobBackend`] is the seam the poller and runner
//! depend on; [`BackendClient`] is the reqwest implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use timeline_core::{Result, TimelineError};

use crate::response::{normalize_capture_response, CaptureFetch};

// ── Wire types ────────────────────────────────────────────────────────────────

/// Job state as reported by `/job`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Success,
    Failure,
    /// The backend's own `error` status.
    Error,
    /// Any other status string; treated as still running.
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PENDING" => JobStatus::Pending,
            "SUCCESS" => JobStatus::Success,
            "FAILURE" => JobStatus::Failure,
            "error" => JobStatus::Error,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// `true` once the job will not change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failure | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => f.write_str("PENDING"),
            JobStatus::Success => f.write_str("SUCCESS"),
            JobStatus::Failure => f.write_str("FAILURE"),
            JobStatus::Error => f.write_str("error"),
            JobStatus::Other(s) => f.write_str(s),
        }
    }
}

/// One `/job` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusReport {
    pub status: JobStatus,
    /// Backend-formatted run time, present once the job has finished.
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    status: String,
    #[serde(default)]
    duration: Option<Value>,
}

impl From<JobResponse> for JobStatusReport {
    fn from(r: JobResponse) -> Self {
        let duration = match r.duration {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        Self {
            status: JobStatus::parse(&r.status),
            duration,
        }
    }
}

/// Extract the job id from a start response, if the job was started.
fn started_job_id(response: StartResponse) -> Option<String> {
    match (response.status.as_deref(), response.job_id) {
        (Some("started"), Some(id)) if !id.is_empty() => Some(id),
        _ => None,
    }
}

// ── JobBackend ────────────────────────────────────────────────────────────────

/// Operations the runtime needs from the job backend.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Start a fingerprint job for `url` in `year`, returning its id.
    async fn start_job(&self, url: &str, year: u16) -> Result<String>;

    /// Current status of `job_id`.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport>;

    /// Fetch and normalize the captures for `url` in `year`.
    async fn fetch_captures(&self, url: &str, year: u16) -> Result<CaptureFetch>;
}

// ── BackendClient ─────────────────────────────────────────────────────────────

/// reqwest-backed [`JobBackend`].
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wayback-timeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TimelineError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET `path` with `query` and decode the body as JSON.
    ///
    /// The HTTP status is not checked: the backend reports failures in the
    /// body, and an undecodable body surfaces as a decode error.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<T, RequestError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, ?query, "backend request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(RequestError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, %url, "backend returned non-success status");
        }

        response.json::<T>().await.map_err(RequestError::Decode)
    }
}

/// Transport vs. body failures, mapped differently per endpoint.
#[derive(Debug)]
enum RequestError {
    Transport(reqwest::Error),
    Decode(reqwest::Error),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Transport(e) => write!(f, "request failed: {e}"),
            RequestError::Decode(e) => write!(f, "invalid response body: {e}"),
        }
    }
}

#[async_trait]
impl JobBackend for BackendClient {
    async fn start_job(&self, url: &str, year: u16) -> Result<String> {
        let response: StartResponse = self
            .get_json(
                "calculate-simhash",
                &[("url", url.to_string()), ("year", year.to_string())],
            )
            .await
            .map_err(|e| match e {
                RequestError::Transport(_) => TimelineError::Connection(e.to_string()),
                RequestError::Decode(_) => {
                    tracing::warn!(error = %e, "start response was not JSON");
                    TimelineError::StartRejected
                }
            })?;

        tracing::debug!(?response, "start response");
        started_job_id(response).ok_or(TimelineError::StartRejected)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport> {
        let response: JobResponse = self
            .get_json("job", &[("job_id", job_id.to_string())])
            .await
            .map_err(|e| TimelineError::Connection(e.to_string()))?;
        Ok(response.into())
    }

    async fn fetch_captures(&self, url: &str, year: u16) -> Result<CaptureFetch> {
        let body: Value = self
            .get_json("simhash", &[("url", url.to_string()), ("year", year.to_string())])
            .await
            .map_err(|e| TimelineError::ResultsFetch(e.to_string()))?;
        Ok(normalize_capture_response(&body))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
