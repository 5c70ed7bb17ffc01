pub mod api;
pub mod job;
pub mod partition;

pub use api::{Choice, JobAction, JOBS_PATH};
pub use job::{Job, JobName, JobStatus};
pub use partition::{BadgeCounts, Partitions, Tab};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/cronboard/config.yaml";

/// Overrides the configured backend base URL.
pub const API_URL_ENV: &str = "CRONBOARD_API_URL";
/// Overrides the configured log level.
pub const LOG_ENV: &str = "CRONBOARD_LOG";
