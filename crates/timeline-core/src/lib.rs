pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod url;

pub use error::{Result, TimelineError};
pub use models::{Capture, CaptureSequence};
