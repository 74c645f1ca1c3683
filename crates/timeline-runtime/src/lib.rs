pub mod client;
pub mod poller;
pub mod response;
pub mod runner;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{BackendClient, JobBackend, JobStatus, JobStatusReport};
pub use poller::{JobOutcome, JobPoller, PollConfig, ProgressSimulator};
pub use response::{normalize_capture_response, CaptureFetch};
pub use runner::{RunnerConfig, SessionRunner};
pub use session::{AnalysisSession, SessionEvent, SessionStage};
