use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use board::{
    ApiError, BoardError, DispatchOutcome, JobBoard, JobsApi, NoticeKind, Notifier,
    PendingAction, RefreshOutcome,
};
use common::{Choice, Job, JobAction, JobName, JobStatus, Tab};
use tokio::sync::oneshot;

enum Scripted {
    Jobs(Vec<Job>),
    Fail,
    Held(oneshot::Receiver<()>, Vec<Job>),
    HeldFail(oneshot::Receiver<()>),
}

/// In-memory backend that replays scripted `list_jobs` answers and records
/// every command it receives.
#[derive(Default)]
struct FakeApi {
    lists: Mutex<VecDeque<Scripted>>,
    list_calls: AtomicUsize,
    actions: Mutex<Vec<(JobName, JobAction)>>,
    reject_actions: bool,
}

impl FakeApi {
    fn with_lists(lists: Vec<Scripted>) -> Self {
        Self {
            lists: Mutex::new(lists.into()),
            ..Default::default()
        }
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn actions(&self) -> Vec<(JobName, JobAction)> {
        self.actions.lock().unwrap().clone()
    }
}

fn backend_error() -> ApiError {
    ApiError::Status {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".to_string(),
    }
}

#[async_trait]
impl JobsApi for FakeApi {
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.lists.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Jobs(jobs)) => Ok(jobs),
            Some(Scripted::Held(gate, jobs)) => {
                let _ = gate.await;
                Ok(jobs)
            }
            Some(Scripted::HeldFail(gate)) => {
                let _ = gate.await;
                Err(backend_error())
            }
            Some(Scripted::Fail) | None => Err(backend_error()),
        }
    }

    async fn get_job(&self, name: &JobName) -> Result<Job, ApiError> {
        Ok(Job::new(name.as_str(), JobStatus::Done, "* * * * *"))
    }

    async fn send_action(&self, name: &JobName, action: JobAction) -> Result<(), ApiError> {
        self.actions.lock().unwrap().push((name.clone(), action));
        if self.reject_actions {
            return Err(backend_error());
        }
        Ok(())
    }
}

fn board(api: FakeApi) -> JobBoard<FakeApi> {
    JobBoard::new(api, Arc::new(Notifier::default()))
}

fn job(name: &str, status: &str, crontab: &str) -> Job {
    Job::new(name, JobStatus::from(status), crontab)
}

#[tokio::test]
async fn test_board_starts_empty() {
    let board = board(FakeApi::default());
    let snapshot = board.snapshot();
    assert_eq!(snapshot.version, 0);
    assert!(snapshot.jobs.is_empty());
    assert_eq!(board.api().list_calls(), 0);
}

#[tokio::test]
async fn test_refresh_replaces_snapshot() {
    let board = board(FakeApi::with_lists(vec![
        Scripted::Jobs(vec![job("a", "running", "* * * * *"), job("b", "done", "")]),
        Scripted::Jobs(vec![job("c", "error", "0 0 * * *")]),
    ]));

    let first = board.refresh().await;
    assert!(matches!(first, RefreshOutcome::Applied { version: 1, jobs: 2 }));
    assert_eq!(board.badge_counts().running, 1);

    board.refresh().await;
    let snapshot = board.snapshot();
    assert_eq!(snapshot.version, 2);
    assert_eq!(snapshot.jobs, vec![job("c", "error", "0 0 * * *")]);
    assert_eq!(board.api().list_calls(), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_snapshot_and_notifies() {
    let board = board(FakeApi::with_lists(vec![
        Scripted::Jobs(vec![job("a", "done", "")]),
        Scripted::Fail,
    ]));
    board.refresh().await;
    let before = board.snapshot();

    let outcome = board.refresh().await;
    assert!(matches!(outcome, RefreshOutcome::Failed(BoardError::Fetch(_))));
    assert_eq!(*board.snapshot(), *before);
    assert_eq!(board.api().list_calls(), 2);

    let notices = board.notifier().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::FetchFailure);
    assert!(notices[0].message.contains("boom"));
}

#[tokio::test]
async fn test_stale_refresh_result_is_dropped() {
    let (release, gate) = oneshot::channel();
    let board = board(FakeApi::with_lists(vec![
        Scripted::Held(gate, vec![job("old", "done", "")]),
        Scripted::Jobs(vec![job("new", "running", "")]),
    ]));

    let (slow, fast) = tokio::join!(board.refresh(), async {
        let outcome = board.refresh().await;
        let _ = release.send(());
        outcome
    });

    assert!(matches!(fast, RefreshOutcome::Applied { version: 2, .. }));
    assert!(matches!(slow, RefreshOutcome::Superseded { ticket: 1 }));
    let snapshot = board.snapshot();
    assert_eq!(snapshot.version, 2);
    assert_eq!(snapshot.jobs[0].name.as_str(), "new");
}

#[tokio::test]
async fn test_stale_refresh_failure_is_not_reported() {
    let (release, gate) = oneshot::channel();
    let board = board(FakeApi::with_lists(vec![
        Scripted::HeldFail(gate),
        Scripted::Jobs(vec![job("new", "done", "")]),
    ]));

    let (slow, fast) = tokio::join!(board.refresh(), async {
        let outcome = board.refresh().await;
        let _ = release.send(());
        outcome
    });

    assert!(matches!(fast, RefreshOutcome::Applied { version: 2, .. }));
    assert!(matches!(slow, RefreshOutcome::Superseded { ticket: 1 }));
    assert_eq!(board.snapshot().jobs[0].name.as_str(), "new");
    assert!(board.notifier().drain().is_empty());
}

#[tokio::test]
async fn test_propose_picks_the_single_legal_action() {
    let board = board(FakeApi::with_lists(vec![Scripted::Jobs(vec![
        job("a", "running", "* * * * *"),
        job("b", "error", "0 0 * * *"),
        job("p", "pending", ""),
        job("u", "cancelling", "* * * * *"),
    ])]));
    board.refresh().await;

    assert_eq!(board.propose("a").unwrap().action(), JobAction::Cancel);
    assert_eq!(board.propose("b").unwrap().action(), JobAction::Start);
    assert_eq!(board.propose("p").unwrap().action(), JobAction::Start);
    assert_eq!(board.propose("u").unwrap().action(), JobAction::Start);
    assert!(board.propose("missing").is_none());
}

#[tokio::test]
async fn test_prompt_shows_name_status_and_schedule() {
    let pending = PendingAction::for_job(&job("a", "running", "* * * * *"));
    let prompt = pending.prompt();
    assert_eq!(prompt.title, "a");
    assert_eq!(prompt.status, JobStatus::Running);
    assert_eq!(prompt.message, "* * * * *");
    assert_eq!(prompt.options, ["Stop job", "Cancel"]);

    let prompt = PendingAction::for_job(&job("b", "done", "")).prompt();
    assert_eq!(prompt.message, "(no schedule)");
    assert_eq!(prompt.options, ["Start job", "Cancel"]);
}

#[tokio::test]
async fn test_dismissed_action_does_nothing() {
    let board = board(FakeApi::with_lists(vec![Scripted::Jobs(vec![job(
        "a", "running", "",
    )])]));
    board.refresh().await;
    let before = board.snapshot();

    let pending = board.propose("a").unwrap();
    let outcome = board.resolve(pending, Choice::Dismiss).await;

    assert!(matches!(outcome, DispatchOutcome::Dismissed));
    assert!(board.api().actions().is_empty());
    assert_eq!(board.api().list_calls(), 1);
    assert!(Arc::ptr_eq(&before, &board.snapshot()));
}

#[tokio::test]
async fn test_confirmed_start_posts_then_refreshes_once() {
    let board = board(FakeApi::with_lists(vec![
        Scripted::Jobs(vec![job("c", "done", "0 0 * * *")]),
        Scripted::Jobs(vec![job("c", "running", "0 0 * * *")]),
    ]));
    board.refresh().await;

    let pending = board.propose("c").unwrap();
    let outcome = board.resolve(pending, Choice::from_index(Some(0))).await;

    match outcome {
        DispatchOutcome::Completed { job, action, refresh } => {
            assert_eq!(job.as_str(), "c");
            assert_eq!(action, JobAction::Start);
            assert!(refresh.is_applied());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(board.api().actions(), vec![(JobName::from("c"), JobAction::Start)]);
    assert_eq!(board.api().list_calls(), 2);
    assert_eq!(board.snapshot().partitions().count(Tab::Running), 1);
}

#[tokio::test]
async fn test_failed_action_is_reported_without_refresh() {
    let api = FakeApi {
        reject_actions: true,
        ..FakeApi::with_lists(vec![Scripted::Jobs(vec![job("a", "running", "")])])
    };
    let board = board(api);
    board.refresh().await;
    board.notifier().drain();
    let before = board.snapshot();

    let pending = board.propose("a").unwrap();
    let outcome = board.confirm(pending).await;

    assert!(matches!(
        outcome,
        DispatchOutcome::Failed(BoardError::Action { action: JobAction::Cancel, .. })
    ));
    assert_eq!(board.api().actions().len(), 1);
    assert_eq!(board.api().list_calls(), 1);
    assert!(Arc::ptr_eq(&before, &board.snapshot()));

    let notices = board.notifier().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::ActionFailure);
    assert!(notices[0].message.contains("cancel job a"));
}

#[tokio::test]
async fn test_action_never_edits_status_locally() {
    let board = board(FakeApi::with_lists(vec![
        Scripted::Jobs(vec![job("a", "done", "")]),
        Scripted::Fail,
    ]));
    board.refresh().await;

    let pending = board.propose("a").unwrap();
    let outcome = board.confirm(pending).await;

    match outcome {
        DispatchOutcome::Completed { refresh, .. } => {
            assert!(matches!(refresh, RefreshOutcome::Failed(_)));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(board.find("a").unwrap().last_status, JobStatus::Done);
}

#[tokio::test]
async fn test_fetch_job_leaves_snapshot_alone() {
    let board = board(FakeApi::default());
    let fetched = board.fetch_job(&JobName::from("solo")).await.unwrap();
    assert_eq!(fetched.name.as_str(), "solo");
    assert_eq!(board.snapshot().version, 0);
}
