use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct JobName(pub String);

impl JobName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        JobName(s.to_string())
    }
}

/// Lifecycle status as reported by the backend.
///
/// Values outside the four known ones are kept verbatim in `Unknown` so a
/// newer backend never makes a job disappear from the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Error,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, JobStatus::Unknown(_))
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            _ => JobStatus::Unknown(s),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        JobStatus::from(s.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: JobName,
    #[serde(default = "unreported_status", deserialize_with = "status_or_unreported")]
    pub last_status: JobStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub crontab: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Seconds until the next scheduled run, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_in: Option<f64>,
}

impl Job {
    pub fn new(name: &str, last_status: JobStatus, crontab: &str) -> Self {
        Self {
            name: JobName::from(name),
            last_status,
            crontab: crontab.to_string(),
            enabled: None,
            next_run_in: None,
        }
    }

    pub fn schedule_label(&self) -> &str {
        if self.crontab.trim().is_empty() {
            "(no schedule)"
        } else {
            &self.crontab
        }
    }

    pub fn next_run_in(&self) -> Option<chrono::Duration> {
        self.next_run_in
            .filter(|secs| secs.is_finite())
            .map(|secs| secs * 1000.0)
            .filter(|ms| ms.abs() < i64::MAX as f64)
            .and_then(|ms| chrono::Duration::try_milliseconds(ms as i64))
    }
}

/// A job the backend has not assigned a status to yet.
fn unreported_status() -> JobStatus {
    JobStatus::Unknown(String::new())
}

fn status_or_unreported<'de, D>(deserializer: D) -> Result<JobStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(JobStatus::from)
        .unwrap_or_else(unreported_status))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parses_known_values() {
        assert_eq!(JobStatus::from("pending"), JobStatus::Pending);
        assert_eq!(JobStatus::from("running"), JobStatus::Running);
        assert_eq!(JobStatus::from("done"), JobStatus::Done);
        assert_eq!(JobStatus::from("error"), JobStatus::Error);
    }

    #[test]
    fn test_status_keeps_unrecognized_value() {
        let status = JobStatus::from("cancelling");
        assert_eq!(status, JobStatus::Unknown("cancelling".to_string()));
        assert!(!status.is_known());
        assert_eq!(status.to_string(), "cancelling");
    }

    #[test]
    fn test_job_from_backend_record() {
        let value = json!({
            "name": "backup",
            "next_run_in": 42.5,
            "last_status": "done",
            "enabled": true,
            "crontab": "0 0 * * *",
            "created_at": "2020-01-01T00:00:00",
            "started_at": null
        });
        let job: Job = serde_json::from_value(value).unwrap();
        assert_eq!(job.name.as_str(), "backup");
        assert_eq!(job.last_status, JobStatus::Done);
        assert_eq!(job.crontab, "0 0 * * *");
        assert_eq!(job.enabled, Some(true));
        assert_eq!(job.next_run_in(), Some(chrono::Duration::milliseconds(42_500)));
    }

    #[test]
    fn test_null_crontab_becomes_empty() {
        let value = json!({"name": "once", "last_status": "pending", "crontab": null});
        let job: Job = serde_json::from_value(value).unwrap();
        assert_eq!(job.crontab, "");
        assert_eq!(job.schedule_label(), "(no schedule)");
    }

    #[test]
    fn test_unknown_status_serializes_verbatim() {
        let job = Job::new("x", JobStatus::from("cancelled"), "* * * * *");
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["last_status"], "cancelled");
        assert!(value.get("enabled").is_none());
    }

    #[test]
    fn test_null_or_missing_status_is_unknown() {
        let jobs: Vec<Job> = serde_json::from_value(json!([
            {"name": "ok", "last_status": "done", "crontab": "* * * * *"},
            {"name": "fresh", "last_status": null, "crontab": "* * * * *"},
            {"name": "bare", "crontab": "0 0 * * *"}
        ]))
        .unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[1].last_status, JobStatus::Unknown(String::new()));
        assert_eq!(jobs[2].last_status, JobStatus::Unknown(String::new()));
        assert!(!jobs[2].last_status.is_known());
    }

    #[test]
    fn test_out_of_range_next_run_is_dropped() {
        let mut job = Job::new("x", JobStatus::Done, "");
        for secs in [-1e300, 1e300, f64::NAN, f64::INFINITY] {
            job.next_run_in = Some(secs);
            assert_eq!(job.next_run_in(), None);
        }
        job.next_run_in = Some(-30.0);
        assert_eq!(job.next_run_in(), Some(chrono::Duration::seconds(-30)));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let value = json!({"last_status": "done", "crontab": "* * * * *"});
        assert!(serde_json::from_value::<Job>(value).is_err());
    }
}
