//! Status partitions derived from a job list.
//!
//! Everything here is a pure function of the slice it is given; nothing is
//! cached between calls.

use serde::{Deserialize, Serialize};
use crate::job::{Job, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    All,
    Running,
    Error,
    Done,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::All, Tab::Running, Tab::Error, Tab::Done];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::All => "All",
            Tab::Running => "Running",
            Tab::Error => "Error",
            Tab::Done => "Done",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            Tab::All => "No jobs.",
            Tab::Running => "No running jobs.",
            Tab::Error => "No error jobs.",
            Tab::Done => "No done jobs.",
        }
    }

    /// Position in the tab bar, starting at 1.
    pub fn position(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).map(|i| i + 1).unwrap_or(1)
    }

    pub fn from_position(n: usize) -> Option<Tab> {
        n.checked_sub(1).and_then(|i| Tab::ALL.get(i).copied())
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Tab::All),
            "running" => Ok(Tab::Running),
            "error" => Ok(Tab::Error),
            "done" => Ok(Tab::Done),
            other => Err(anyhow::anyhow!("Unknown tab: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partitions<'a> {
    pub all: Vec<&'a Job>,
    pub running: Vec<&'a Job>,
    pub error: Vec<&'a Job>,
    pub done: Vec<&'a Job>,
}

impl<'a> Partitions<'a> {
    pub fn of(jobs: &'a [Job]) -> Self {
        let with_status = |status: JobStatus| -> Vec<&'a Job> {
            jobs.iter().filter(|j| j.last_status == status).collect()
        };

        Self {
            all: jobs.iter().collect(),
            running: with_status(JobStatus::Running),
            error: with_status(JobStatus::Error),
            done: with_status(JobStatus::Done),
        }
    }

    pub fn tab(&self, tab: Tab) -> &[&'a Job] {
        match tab {
            Tab::All => &self.all,
            Tab::Running => &self.running,
            Tab::Error => &self.error,
            Tab::Done => &self.done,
        }
    }

    pub fn count(&self, tab: Tab) -> usize {
        self.tab(tab).len()
    }

    /// Jobs that only show up under All: pending ones and unrecognized statuses.
    pub fn pending_or_unknown(&self) -> usize {
        self.all.len() - self.running.len() - self.error.len() - self.done.len()
    }

    pub fn badge_counts(&self) -> BadgeCounts {
        BadgeCounts {
            all: self.all.len(),
            running: self.running.len(),
            error: self.error.len(),
            done: self.done.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BadgeCounts {
    pub all: usize,
    pub running: usize,
    pub error: usize,
    pub done: usize,
}

impl BadgeCounts {
    pub fn get(&self, tab: Tab) -> usize {
        match tab {
            Tab::All => self.all,
            Tab::Running => self.running,
            Tab::Error => self.error,
            Tab::Done => self.done,
        }
    }
}
