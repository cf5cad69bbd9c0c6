use thiserror::Error;

use crate::types::AssessmentStatus;

/// Failures of a single check run. None of them are retried.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The request never completed (DNS failure, refused connection, timeout).
    #[error("failed to reach assessment API: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("API returned non-OK status: {0}")]
    UnexpectedStatus(String),

    /// The body was not JSON or did not match the expected record.
    #[error("failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("maximum number of concurrent assessments reached ({current}/{max}), please try again later")]
    CapacityExceeded { current: i32, max: i32 },

    #[error("assessment of {host} did not finish after {attempts} status checks")]
    PollTimeout { host: String, attempts: u32 },

    /// Rendering was asked for an assessment that is still running.
    #[error("cannot render assessment in non-terminal status {0}")]
    NotTerminal(AssessmentStatus),
}

pub type Result<T> = std::result::Result<T, CheckError>;
