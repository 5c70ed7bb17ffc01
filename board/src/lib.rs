pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod notifier;

pub use board::{DispatchOutcome, JobBoard, PendingAction, Prompt, RefreshOutcome, Snapshot};
pub use client::{HttpJobsApi, JobsApi};
pub use config::Config;
pub use error::{ApiError, BoardError};
pub use notifier::{Notice, NoticeKind, Notifier};
