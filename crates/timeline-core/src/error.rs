use thiserror::Error;

/// All errors produced by the timeline tools.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// A capture sequence was constructed with no captures.
    #[error("Capture sequence must contain at least one capture")]
    EmptySequence,

    /// The backend answered the start request without a job id.
    #[error("Backend did not start a job")]
    StartRejected,

    /// The backend could not be reached.
    #[error("Failed to reach backend: {0}")]
    Connection(String),

    /// The backend reported a terminal failure for the job.
    #[error("Job {job_id} failed")]
    JobFailed { job_id: String },

    /// The job did not reach a terminal state within the poll budget.
    #[error("Job {job_id} still running after {attempts} polls")]
    PollTimeout { job_id: String, attempts: u32 },

    /// The session was cancelled before it finished.
    #[error("Session cancelled")]
    Cancelled,

    /// The backend returned an explicit error object.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The results response held no usable captures.
    #[error("No captures in results")]
    NoCaptures,

    /// The results request failed in transport or decoding.
    #[error("Failed to fetch results: {0}")]
    ResultsFetch(String),

    /// A background task panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for raw I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TimelineError {
    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            TimelineError::StartRejected => {
                "Failed to start calculation. Please try again.".to_string()
            }
            TimelineError::Connection(_) => {
                "Failed to connect to the server. Make sure the backend is running.".to_string()
            }
            TimelineError::JobFailed { .. } => {
                "Job failed. The website may not have enough archived snapshots.".to_string()
            }
            TimelineError::PollTimeout { .. } => {
                "Job did not finish in time. Please try again later.".to_string()
            }
            TimelineError::EmptySequence | TimelineError::NoCaptures => {
                "No snapshots found for this website and year.".to_string()
            }
            TimelineError::Backend(info) => info.clone(),
            TimelineError::ResultsFetch(_) | TimelineError::JsonParse(_) => {
                "Failed to fetch results. Please try again.".to_string()
            }
            TimelineError::Cancelled => "Cancelled.".to_string(),
            TimelineError::Task(_) => "Unexpected internal error. Please try again.".to_string(),
            TimelineError::Io(e) => format!("I/O error: {e}"),
            TimelineError::Config(msg) => format!("Configuration error: {msg}"),
        }
    }
}

/// Convenience alias used throughout the timeline crates.
pub type Result<T> = std::result::Result<T, TimelineError>;
