//! End-to-end session driver.
//!
//! [`SessionRunner`] walks one [`AnalysisSession`] through start, poll, and
//! fetch, then hands the captures to the analysis pipeline. Updates go to the
//! caller over an `mpsc` channel of [`SessionEvent`]s and a `watch` channel
//! carrying cosmetic progress, so the display side shares no mutable state
//! with the runner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use timeline_core::{Result, TimelineError};
use timeline_data::analysis::{analyze_timeline, TimelineAnalysis};

use crate::client::JobBackend;
use crate::poller::{JobOutcome, JobPoller, PollConfig, ProgressSimulator};
use crate::session::{AnalysisSession, SessionEvent, SessionStage};

/// Default pause between job success and the results request.
pub const DEFAULT_RESULTS_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    pub poll: PollConfig,
    /// Wait after `SUCCESS` before requesting results.
    pub results_delay: Duration,
    /// Progress simulator tick.
    pub progress_tick: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            results_delay: DEFAULT_RESULTS_DELAY,
            progress_tick: Duration::from_secs(1),
        }
    }
}

pub struct SessionRunner<B> {
    backend: Arc<B>,
    config: RunnerConfig,
    events: Option<mpsc::Sender<SessionEvent>>,
    progress: Option<Arc<watch::Sender<f64>>>,
}

impl<B: JobBackend + 'static> SessionRunner<B> {
    pub fn new(backend: Arc<B>, config: RunnerConfig) -> Self {
        Self {
            backend,
            config,
            events: None,
            progress: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::Sender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Drive a progress percentage (0–100) while the job runs.
    pub fn with_progress(mut self, progress: watch::Sender<f64>) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Run `session` to completion.
    ///
    /// The session is reset first. On failure it is left in
    /// [`SessionStage::Failed`] with the user-facing message and the error is
    /// returned; on success it holds the captures and is `Completed`.
    pub async fn run(
        &self,
        session: &mut AnalysisSession,
        cancel: CancellationToken,
    ) -> Result<TimelineAnalysis> {
        session.reset();
        tracing::info!(url = %session.url, year = session.year, "starting analysis session");

        match self.drive(session, &cancel).await {
            Ok(analysis) => Ok(analysis),
            Err(e) => {
                session.mark_failed(&e);
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut AnalysisSession,
        cancel: &CancellationToken,
    ) -> Result<TimelineAnalysis> {
        session.stage = SessionStage::Submitted;
        let job_id = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TimelineError::Cancelled),
            r = self.backend.start_job(&session.url, session.year) => r?,
        };

        tracing::info!(%job_id, "job started");
        session.job_id = Some(job_id.clone());
        session.stage = SessionStage::Polling;
        self.emit(SessionEvent::JobStarted {
            job_id: job_id.clone(),
        })
        .await;

        let duration = match self.poll_job(session, &job_id, cancel).await? {
            JobOutcome::Completed { duration } => duration,
            JobOutcome::Failed { status } => {
                tracing::warn!(%job_id, %status, "job ended without results");
                return Err(TimelineError::JobFailed { job_id });
            }
        };

        session.duration = duration.clone();
        if let Some(progress) = &self.progress {
            progress.send_replace(100.0);
        }
        self.emit(SessionEvent::Completed { duration }).await;

        session.stage = SessionStage::Fetching;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TimelineError::Cancelled),
            _ = tokio::time::sleep(self.config.results_delay) => {}
        }

        let fetch = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TimelineError::Cancelled),
            r = self.backend.fetch_captures(&session.url, session.year) => r?,
        };
        let captures = fetch.into_result()?;

        let analysis = analyze_timeline(captures.clone(), &session.url);
        session.captures = Some(captures);
        session.stage = SessionStage::Completed;
        self.emit(SessionEvent::ResultsLoaded {
            captures: analysis.captures.len(),
        })
        .await;

        Ok(analysis)
    }

    /// Poll in a background task, recording status on `session` as it
    /// arrives. The progress simulator runs for exactly as long as the
    /// poller.
    async fn poll_job(
        &self,
        session: &mut AnalysisSession,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome> {
        let child = cancel.child_token();
        let (tx, mut rx) = mpsc::channel(16);

        let mut poll_task = JobPoller::new(self.backend.clone(), self.config.poll)
            .with_events(tx)
            .spawn(job_id.to_string(), child.clone());
        let progress_task = self.progress.as_ref().map(|progress| {
            ProgressSimulator::new(self.config.progress_tick).spawn(child.clone(), progress.clone())
        });

        let joined = loop {
            tokio::select! {
                biased;
                Some(event) = rx.recv() => self.record(session, event).await,
                joined = &mut poll_task => break joined,
            }
        };
        while let Ok(event) = rx.try_recv() {
            self.record(session, event).await;
        }

        child.cancel();
        if let Some(task) = progress_task {
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "progress task ended abnormally");
            }
        }

        joined.map_err(join_error)?
    }

    async fn record(&self, session: &mut AnalysisSession, event: SessionEvent) {
        if let SessionEvent::Status { status, .. } = &event {
            session.last_status = Some(status.clone());
        }
        self.emit(event).await;
    }

    async fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).await.is_err() {
                tracing::debug!("event receiver dropped");
            }
        }
    }
}

fn join_error(e: JoinError) -> TimelineError {
    if e.is_cancelled() {
        TimelineError::Cancelled
    } else {
        TimelineError::Task(e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
