use anyhow::Result;
use board::{Notice, Prompt, Snapshot};
use comfy_table::{Cell, Color, Table};
use common::{Job, JobStatus, Tab};

pub fn status_color(status: &JobStatus) -> Color {
    match status {
        JobStatus::Pending => Color::DarkYellow,
        JobStatus::Running => Color::Green,
        JobStatus::Done => Color::Reset,
        JobStatus::Error => Color::Red,
        JobStatus::Unknown(_) => Color::Grey,
    }
}

pub fn status_label(status: &JobStatus) -> String {
    match status {
        JobStatus::Unknown(raw) if raw.is_empty() => "unknown".to_string(),
        JobStatus::Unknown(raw) => format!("unknown({})", raw),
        known => known.to_string(),
    }
}

fn status_badge(status: &JobStatus) -> Cell {
    Cell::new(status_label(status)).fg(status_color(status))
}

pub fn next_run_label(job: &Job) -> String {
    let Some(d) = job.next_run_in() else {
        return "-".to_string();
    };
    let secs = d.num_seconds();
    if secs < 0 {
        return "overdue".to_string();
    }
    match (secs / 3600, (secs % 3600) / 60, secs % 60) {
        (0, 0, s) => format!("in {}s", s),
        (0, m, s) => format!("in {}m {}s", m, s),
        (h, m, _) => format!("in {}h {}m", h, m),
    }
}

pub fn title_bar() -> String {
    format!("{:<40}{}", "Cronboard", "[r] Refresh")
}

pub fn tab_bar(snapshot: &Snapshot, current: Tab) -> String {
    let counts = snapshot.partitions().badge_counts();
    Tab::ALL
        .iter()
        .map(|tab| {
            let label = format!("{}:{} ({})", tab.position(), tab.title(), counts.get(*tab));
            if *tab == current {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn job_table(jobs: &[&Job]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Status", "Schedule", "Next run"]);
    for (i, job) in jobs.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&job.name),
            status_badge(&job.last_status),
            Cell::new(job.schedule_label()),
            Cell::new(next_run_label(job)),
        ]);
    }
    table
}

pub fn tab_view(snapshot: &Snapshot, tab: Tab) -> String {
    let partitions = snapshot.partitions();
    let jobs = partitions.tab(tab);
    if jobs.is_empty() {
        tab.empty_message().to_string()
    } else {
        job_table(jobs).to_string()
    }
}

pub fn notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| {
            if n.kind.is_failure() {
                format!("! {}", n.message)
            } else {
                format!("* {}", n.message)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn board_view(snapshot: &Snapshot, tab: Tab, visible: &[Notice]) -> String {
    let mut out = String::new();
    out.push_str(&title_bar());
    out.push('\n');
    if !visible.is_empty() {
        out.push_str(&notices(visible));
        out.push('\n');
    }
    out.push_str(&tab_bar(snapshot, tab));
    out.push('\n');
    out.push_str(&tab_view(snapshot, tab));
    out
}

pub fn prompt_view(prompt: &Prompt) -> String {
    let mut out = format!(
        "{} [{}]\n  schedule: {}\n",
        prompt.title,
        status_label(&prompt.status),
        prompt.message
    );
    for (i, option) in prompt.options.iter().enumerate() {
        out.push_str(&format!("  {}) {}\n", i + 1, option));
    }
    out
}

pub fn job_detail(job: &Job) -> String {
    let mut out = String::from("Job Details:\n");
    out.push_str(&format!("  Name:     {}\n", job.name));
    out.push_str(&format!("  Status:   {}\n", status_label(&job.last_status)));
    out.push_str(&format!("  Schedule: {}\n", job.schedule_label()));
    out.push_str(&format!("  Next run: {}\n", next_run_label(job)));
    if let Some(enabled) = job.enabled {
        out.push_str(&format!("  Enabled:  {}\n", enabled));
    }
    out
}

pub fn jobs_json(jobs: &[&Job]) -> Result<String> {
    Ok(serde_json::to_string_pretty(jobs)?)
}

pub fn jobs_csv(jobs: &[&Job]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "last_status", "crontab"])?;
    for job in jobs {
        writer.write_record([job.name.as_str(), job.last_status.as_str(), job.crontab.as_str()])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}
