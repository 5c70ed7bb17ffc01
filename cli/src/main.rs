mod interactive;
mod render;

use anyhow::{anyhow, bail, Context};
use board::{Config, DispatchOutcome, HttpJobsApi, JobBoard, Notifier, RefreshOutcome};
use clap::{Parser, Subcommand, ValueEnum};
use common::{Choice, JobAction, JobName, Tab};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

#[derive(Parser)]
#[command(author, version, about = "Monitor and control cron jobs", long_about = None)]
struct Cli {
    /// Config file (.yaml, .yml or .toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Backend base URL, overrides config and environment
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive job board (default)
    Board {
        /// Tab to open on
        #[arg(long)]
        tab: Option<Tab>,
    },
    /// Print the jobs of one tab
    List {
        #[arg(long, default_value = "all")]
        tab: Tab,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Show a single job
    Show {
        name: String,
    },
    /// Start a job that is not running
    Start {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Cancel a running job
    Cancel {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    board::logging::setup_logging(&config.logging)?;

    let api = HttpJobsApi::new(&config.api).context("Failed to set up backend client")?;
    log::info!("Using backend at {}", api.base_url());
    let notifier = Arc::new(Notifier::new(config.display.notice_ttl()));
    let board = JobBoard::new(api, notifier);

    match cli.command.unwrap_or(Commands::Board { tab: None }) {
        Commands::Board { tab } => {
            interactive::run(&board, tab.unwrap_or(config.display.initial_tab)).await?;
        }
        Commands::List { tab, format } => {
            if let RefreshOutcome::Failed(e) = board.refresh().await {
                return Err(e.into());
            }
            let snapshot = board.snapshot();
            let partitions = snapshot.partitions();
            let jobs = partitions.tab(tab);
            match format {
                Format::Table => println!("{}", render::tab_view(&snapshot, tab)),
                Format::Json => println!("{}", render::jobs_json(jobs)?),
                Format::Csv => print!("{}", render::jobs_csv(jobs)?),
            }
        }
        Commands::Show { name } => {
            let job = board.fetch_job(&JobName(name)).await?;
            print!("{}", render::job_detail(&job));
        }
        Commands::Start { name, yes } => request(&board, &name, JobAction::Start, yes).await?,
        Commands::Cancel { name, yes } => request(&board, &name, JobAction::Cancel, yes).await?,
    }

    Ok(())
}

/// One-shot start/cancel: loads the board, checks the requested action is
/// the legal one for the job, confirms and dispatches.
async fn request(
    board: &JobBoard<HttpJobsApi>,
    name: &str,
    requested: JobAction,
    yes: bool,
) -> anyhow::Result<()> {
    if let RefreshOutcome::Failed(e) = board.refresh().await {
        return Err(e.into());
    }

    let pending = board
        .propose(name)
        .ok_or_else(|| anyhow!("Job not found: {}", name))?;
    if pending.action() != requested {
        bail!(
            "Job {} is {}; only {} is allowed",
            name,
            render::status_label(&pending.job().last_status),
            pending.action()
        );
    }

    let choice = if yes {
        Choice::Confirm
    } else {
        print!("{}", render::prompt_view(&pending.prompt()));
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        interactive::read_choice(&mut lines).await?
    };

    let outcome = board.resolve(pending, choice).await;
    interactive::report(&outcome);
    match outcome {
        DispatchOutcome::Failed(e) => Err(e.into()),
        DispatchOutcome::Completed { job, .. } => {
            if let Some(job) = board.find(job.as_str()) {
                println!("{} is now {}", job.name, render::status_label(&job.last_status));
            }
            Ok(())
        }
        DispatchOutcome::Dismissed => Ok(()),
    }
}
