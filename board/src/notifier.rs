use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    FetchFailure,
    ActionFailure,
    Info,
}

impl NoticeKind {
    pub fn is_failure(&self) -> bool {
        !matches!(self, NoticeKind::Info)
    }
}

/// A short-lived, non-blocking message for the user.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: Instant,
    pub ttl: Duration,
}

impl Notice {
    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Instant::now())
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < self.ttl
    }
}

/// Queue of transient notices. Expired notices are dropped when read.
pub struct Notifier {
    ttl: Duration,
    notices: Mutex<VecDeque<Notice>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        if kind.is_failure() {
            log::warn!("{:?}: {}", kind, message);
        } else {
            log::info!("{}", message);
        }

        let notice = Notice {
            kind,
            message,
            raised_at: Instant::now(),
            ttl: self.ttl,
        };
        self.lock().push_back(notice);
    }

    /// Notices still within their lifetime, oldest first.
    pub fn visible(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut notices = self.lock();
        notices.retain(|n| n.is_visible_at(now));
        notices.iter().cloned().collect()
    }

    /// Takes every pending notice regardless of age.
    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notice>> {
        // A panic while holding the lock cannot leave the queue half-written.
        self.notices.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}
