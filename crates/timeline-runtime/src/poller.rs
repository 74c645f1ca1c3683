//! Job status polling and cosmetic progress.
//!
//! [`JobPoller`] is a single cancellable task that polls `/job` on a fixed
//! interval until the job reaches a terminal status, the poll budget runs
//! out, or its [`CancellationToken`] fires. [`ProgressSimulator`] is an
//! independent task that only drives a progress indicator; it shares the
//! token and carries no job state.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use timeline_core::{Result, TimelineError};

use crate::client::{JobBackend, JobStatus};
use crate::session::SessionEvent;

/// Default seconds between polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
/// Default poll budget (ten minutes at the default interval).
pub const DEFAULT_MAX_POLLS: u32 = 300;

// ── JobPoller ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// Terminal result of a polled job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { duration: Option<String> },
    /// `FAILURE` or `error`; carries the raw status.
    Failed { status: String },
}

pub struct JobPoller<B> {
    backend: Arc<B>,
    config: PollConfig,
    events: Option<mpsc::Sender<SessionEvent>>,
}

impl<B: JobBackend + 'static> JobPoller<B> {
    pub fn new(backend: Arc<B>, config: PollConfig) -> Self {
        Self {
            backend,
            config,
            events: None,
        }
    }

    /// Send a [`SessionEvent::Status`] for every answered poll.
    pub fn with_events(mut self, events: mpsc::Sender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run [`JobPoller::poll`] in its own tokio task.
    pub fn spawn(self, job_id: String, cancel: CancellationToken) -> JoinHandle<Result<JobOutcome>> {
        tokio::spawn(async move { self.poll(&job_id, &cancel).await })
    }

    /// Poll until a terminal status, the poll budget, or cancellation.
    ///
    /// The first poll happens one interval after the call. A failed poll
    /// request is logged and the next tick proceeds as normal; it still
    /// counts against `max_polls`.
    pub async fn poll(&self, job_id: &str, cancel: &CancellationToken) -> Result<JobOutcome> {
        if self.config.interval.is_zero() {
            return Err(TimelineError::Config(
                "poll interval must be non-zero".to_string(),
            ));
        }

        let mut ticker = time::interval_at(Instant::now() + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempts: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TimelineError::Cancelled),
                _ = ticker.tick() => {}
            }

            attempts += 1;
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TimelineError::Cancelled),
                r = self.backend.job_status(job_id) => r,
            };

            match polled {
                Ok(report) => {
                    tracing::debug!(job_id, attempt = attempts, status = %report.status, "job status");
                    self.emit(SessionEvent::Status {
                        status: report.status.to_string(),
                        attempt: attempts,
                    })
                    .await;

                    match report.status {
                        JobStatus::Success => {
                            tracing::info!(job_id, attempts, "job succeeded");
                            return Ok(JobOutcome::Completed {
                                duration: report.duration,
                            });
                        }
                        JobStatus::Failure | JobStatus::Error => {
                            tracing::info!(job_id, attempts, status = %report.status, "job failed");
                            return Ok(JobOutcome::Failed {
                                status: report.status.to_string(),
                            });
                        }
                        JobStatus::Pending | JobStatus::Other(_) => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(job_id, attempt = attempts, error = %e, "job status poll failed");
                }
            }

            if attempts >= self.config.max_polls {
                return Err(TimelineError::PollTimeout {
                    job_id: job_id.to_string(),
                    attempts,
                });
            }
        }
    }

    async fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).await.is_err() {
                tracing::debug!("event receiver dropped");
            }
        }
    }
}

// ── ProgressSimulator ─────────────────────────────────────────────────────────

/// Cosmetic progress that creeps toward a cap while a job runs.
pub struct ProgressSimulator {
    tick: Duration,
    cap: f64,
    max_step: f64,
    rng: StdRng,
}

impl ProgressSimulator {
    /// Ticks every `tick`, adding a random step of up to 10 % and never
    /// passing 90 %.
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            cap: 90.0,
            max_step: 10.0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Publish progress into `progress` until `cancel` fires.
    pub fn spawn(mut self, cancel: CancellationToken, progress: Arc<watch::Sender<f64>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.tick.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut current: f64 = 0.0;

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if current < self.cap {
                            current += self.rng.gen::<f64>() * self.max_step;
                            progress.send_replace(current.min(self.cap));
                        }
                    }
                }
            }
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
