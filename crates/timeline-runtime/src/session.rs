//! Request-scoped state for one URL + year analysis run.
//!
//! An [`AnalysisSession`] is owned by the caller and handed to the
//! [`SessionRunner`](crate::runner::SessionRunner), which records progress on
//! it. Progress is also streamed as [`SessionEvent`]s for display.

use chrono::{DateTime, Utc};

use timeline_core::{CaptureSequence, TimelineError};

/// Where a session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStage {
    Idle,
    /// Start request sent, no job id yet.
    Submitted,
    Polling,
    /// Job succeeded; fetching captures.
    Fetching,
    Completed,
    /// Terminal failure with the message shown to the user.
    Failed(String),
}

/// Notifications streamed while a session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    JobStarted { job_id: String },
    /// Raw status string from a `/job` poll.
    Status { status: String, attempt: u32 },
    Completed { duration: Option<String> },
    ResultsLoaded { captures: usize },
}

#[derive(Debug, Clone)]
pub struct AnalysisSession {
    pub url: String,
    pub year: u16,
    pub job_id: Option<String>,
    pub stage: SessionStage,
    /// Most recent `/job` status string.
    pub last_status: Option<String>,
    /// Backend-reported run time of the finished job.
    pub duration: Option<String>,
    /// Captures of the last successful run, kept for re-export.
    pub captures: Option<CaptureSequence>,
    pub started_at: DateTime<Utc>,
}

impl AnalysisSession {
    pub fn new(url: impl Into<String>, year: u16) -> Self {
        Self {
            url: url.into(),
            year,
            job_id: None,
            stage: SessionStage::Idle,
            last_status: None,
            duration: None,
            captures: None,
            started_at: Utc::now(),
        }
    }

    /// Record a failure, dropping any partial results.
    pub fn mark_failed(&mut self, err: &TimelineError) {
        tracing::debug!(error = %err, job_id = ?self.job_id, "session failed");
        self.captures = None;
        self.stage = SessionStage::Failed(err.user_message());
    }

    /// Return to the idle state, clearing everything but the target.
    pub fn reset(&mut self) {
        self.job_id = None;
        self.stage = SessionStage::Idle;
        self.last_status = None;
        self.duration = None;
        self.captures = None;
        self.started_at = Utc::now();
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.stage, SessionStage::Completed | SessionStage::Failed(_))
    }

    /// Time since the session was created or last reset.
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}
