use common::{JobAction, JobName};
use thiserror::Error;

/// Failures talking to the job-scheduling backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// The two failure kinds surfaced by the board. Neither is fatal.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("failed to fetch jobs: {0}")]
    Fetch(#[source] ApiError),

    #[error("failed to {action} job {job}: {source}")]
    Action {
        job: JobName,
        action: JobAction,
        #[source]
        source: ApiError,
    },
}
