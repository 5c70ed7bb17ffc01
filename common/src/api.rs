use serde::{Deserialize, Serialize};
use anyhow::{anyhow, Result};
use crate::job::JobStatus;

/// Path segments of the jobs collection under the backend base URL.
pub const JOBS_PATH: [&str; 2] = ["api", "jobs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    Start,
    Cancel,
}

impl JobAction {
    /// The single action a user may request for a job in `status`.
    pub fn for_status(status: &JobStatus) -> Self {
        match status {
            JobStatus::Running => JobAction::Cancel,
            _ => JobAction::Start,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Start => "start",
            JobAction::Cancel => "cancel",
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            JobAction::Start => "Start job",
            JobAction::Cancel => "Stop job",
        }
    }
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(JobAction::Start),
            "cancel" | "stop" => Ok(JobAction::Cancel),
            other => Err(anyhow!("Unknown action: {}", other)),
        }
    }
}

/// Outcome of the confirmation interstitial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Confirm,
    Dismiss,
}

impl Choice {
    /// Maps a pressed option index to a choice. Only the first option
    /// confirms; the trailing "Cancel" option, any other index and a
    /// closed prompt (`None`) all dismiss.
    pub fn from_index(index: Option<usize>) -> Self {
        match index {
            Some(0) => Choice::Confirm,
            _ => Choice::Dismiss,
        }
    }
}
