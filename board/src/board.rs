//! The job board view-model.
//!
//! The board owns the only copy of the job snapshot. Refresh replaces it
//! wholesale; partitions are derived from it on demand; actions go through
//! an explicit propose/confirm protocol and never touch job status locally.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use common::{BadgeCounts, Choice, Job, JobAction, JobName, JobStatus, Partitions};

use crate::client::JobsApi;
use crate::error::BoardError;
use crate::notifier::{NoticeKind, Notifier};

/// All jobs known to the backend as of one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Ticket of the refresh that produced this snapshot; 0 before the first one.
    pub version: u64,
    pub jobs: Vec<Job>,
}

impl Snapshot {
    pub fn partitions(&self) -> Partitions<'_> {
        Partitions::of(&self.jobs)
    }

    pub fn find(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name.as_str() == name)
    }
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Applied { version: u64, jobs: usize },
    /// A newer refresh was started while this one was in flight; its result
    /// or failure was dropped.
    Superseded { ticket: u64 },
    Failed(BoardError),
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }
}

/// Text shown in the confirmation interstitial.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub title: String,
    pub status: JobStatus,
    pub message: String,
    pub options: [&'static str; 2],
}

/// A proposed command awaiting confirmation. Consumed by [`JobBoard::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    job: Job,
    action: JobAction,
}

impl PendingAction {
    pub fn for_job(job: &Job) -> Self {
        Self {
            job: job.clone(),
            action: JobAction::for_status(&job.last_status),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn action(&self) -> JobAction {
        self.action
    }

    pub fn prompt(&self) -> Prompt {
        Prompt {
            title: self.job.name.to_string(),
            status: self.job.last_status.clone(),
            message: self.job.schedule_label().to_string(),
            options: [self.action.button_label(), "Cancel"],
        }
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Dismissed,
    Completed {
        job: JobName,
        action: JobAction,
        refresh: RefreshOutcome,
    },
    Failed(BoardError),
}

pub struct JobBoard<A> {
    api: A,
    notifier: Arc<Notifier>,
    snapshot: Mutex<Arc<Snapshot>>,
    refreshes_started: AtomicU64,
}

impl<A: JobsApi> JobBoard<A> {
    pub fn new(api: A, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            notifier,
            snapshot: Mutex::new(Arc::new(Snapshot::default())),
            refreshes_started: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.lock_snapshot().clone()
    }

    pub fn badge_counts(&self) -> BadgeCounts {
        self.snapshot().partitions().badge_counts()
    }

    pub fn find(&self, name: &str) -> Option<Job> {
        self.snapshot().find(name).cloned()
    }

    /// Reloads the job list. Failures are reported through the notifier and
    /// leave the current snapshot in place.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.refreshes_started.fetch_add(1, Ordering::SeqCst) + 1;

        let jobs = match self.api.list_jobs().await {
            Ok(jobs) => jobs,
            Err(e) if self.is_superseded(ticket) => {
                log::debug!("Ignoring failure of refresh #{}: a newer refresh was started: {}", ticket, e);
                return RefreshOutcome::Superseded { ticket };
            }
            Err(e) => {
                let err = BoardError::Fetch(e);
                self.notifier.push(NoticeKind::FetchFailure, err.to_string());
                return RefreshOutcome::Failed(err);
            }
        };

        let mut current = self.lock_snapshot();
        if self.is_superseded(ticket) {
            log::debug!("Dropping result of refresh #{}: a newer refresh was started", ticket);
            return RefreshOutcome::Superseded { ticket };
        }

        let count = jobs.len();
        *current = Arc::new(Snapshot { version: ticket, jobs });
        log::info!("Loaded {} jobs (snapshot #{})", count, ticket);
        RefreshOutcome::Applied { version: ticket, jobs: count }
    }

    /// Proposes the legal action for the named job in the current snapshot.
    pub fn propose(&self, name: &str) -> Option<PendingAction> {
        self.snapshot().find(name).map(PendingAction::for_job)
    }

    pub async fn resolve(&self, pending: PendingAction, choice: Choice) -> DispatchOutcome {
        match choice {
            Choice::Confirm => self.confirm(pending).await,
            Choice::Dismiss => self.dismiss(pending),
        }
    }

    pub fn dismiss(&self, pending: PendingAction) -> DispatchOutcome {
        log::debug!("Dismissed {} of job {}", pending.action, pending.job.name);
        DispatchOutcome::Dismissed
    }

    /// Sends the command, then reloads the board if the backend accepted it.
    pub async fn confirm(&self, pending: PendingAction) -> DispatchOutcome {
        let PendingAction { job, action } = pending;
        log::info!("Requesting {} of job {}", action, job.name);

        if let Err(e) = self.api.send_action(&job.name, action).await {
            let err = BoardError::Action {
                job: job.name,
                action,
                source: e,
            };
            self.notifier.push(NoticeKind::ActionFailure, err.to_string());
            return DispatchOutcome::Failed(err);
        }

        let refresh = self.refresh().await;
        DispatchOutcome::Completed {
            job: job.name,
            action,
            refresh,
        }
    }

    /// Reads a single job straight from the backend without touching the snapshot.
    pub async fn fetch_job(&self, name: &JobName) -> Result<Job, BoardError> {
        self.api.get_job(name).await.map_err(BoardError::Fetch)
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.refreshes_started.load(Ordering::SeqCst) != ticket
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, Arc<Snapshot>> {
        self.snapshot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
