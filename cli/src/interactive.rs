use anyhow::Result;
use board::{DispatchOutcome, JobBoard, JobsApi, NoticeKind, PendingAction};
use common::{Choice, Tab};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::render;

#[derive(Debug, PartialEq)]
enum Command {
    Refresh,
    Tab(Tab),
    Open(usize),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let arg = parts.next();

    let cmd = match (head, arg) {
        ("r" | "refresh", None) => Command::Refresh,
        ("q" | "quit" | "exit", None) => Command::Quit,
        ("h" | "help" | "?", None) => Command::Help,
        ("t" | "tab", Some(name)) => match name.parse::<Tab>() {
            Ok(tab) => Command::Tab(tab),
            Err(_) => Command::Unknown(line.trim().to_string()),
        },
        ("o" | "open", Some(row)) => match row.parse::<usize>() {
            Ok(n) if n > 0 => Command::Open(n),
            _ => Command::Unknown(line.trim().to_string()),
        },
        (n, None) => match n.parse::<usize>().ok().and_then(Tab::from_position) {
            Some(tab) => Command::Tab(tab),
            None => Command::Unknown(line.trim().to_string()),
        },
        _ => Command::Unknown(line.trim().to_string()),
    };
    Some(cmd)
}

const HELP: &str = "\
r           refresh the job list
1-4         switch tab (All, Running, Error, Done)
t <tab>     switch tab by name
o <row>     act on a job in the current tab
q           quit";

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

/// Reads the user's answer to a confirmation prompt. End of input dismisses.
pub async fn read_choice<R>(lines: &mut Lines<R>) -> Result<Choice>
where
    R: AsyncBufRead + Unpin,
{
    prompt("choice> ")?;
    let answer = lines.next_line().await?;
    let index = answer
        .and_then(|a| a.trim().parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1));
    Ok(Choice::from_index(index))
}

pub fn report(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Dismissed => println!("Aborted."),
        DispatchOutcome::Completed { job, action, .. } => {
            println!("Requested {} of job {}", action, job)
        }
        // already surfaced as a notice
        DispatchOutcome::Failed(_) => {}
    }
}

pub async fn run<A: JobsApi>(board: &JobBoard<A>, initial_tab: Tab) -> Result<()> {
    let mut tab = initial_tab;
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    board.refresh().await;

    loop {
        let snapshot = board.snapshot();
        println!("\n{}", render::board_view(&snapshot, tab, &board.notifier().visible()));
        prompt("> ")?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Refresh => {
                board.refresh().await;
            }
            Command::Tab(t) => tab = t,
            Command::Help => println!("{}", HELP),
            Command::Unknown(input) => {
                board
                    .notifier()
                    .push(NoticeKind::Info, format!("Unknown command {:?}, try 'help'", input));
            }
            Command::Open(row) => {
                let pending = match snapshot.partitions().tab(tab).get(row - 1) {
                    Some(job) => PendingAction::for_job(job),
                    None => {
                        board
                            .notifier()
                            .push(NoticeKind::Info, format!("No row {} in {}", row, tab));
                        continue;
                    }
                };

                println!("{}", render::prompt_view(&pending.prompt()));
                let choice = read_choice(&mut lines).await?;
                let outcome = board.resolve(pending, choice).await;
                report(&outcome);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("r"), Some(Command::Refresh));
        assert_eq!(parse_command("  quit "), Some(Command::Quit));
        assert_eq!(parse_command("3"), Some(Command::Tab(Tab::Error)));
        assert_eq!(parse_command("t done"), Some(Command::Tab(Tab::Done)));
        assert_eq!(parse_command("o 2"), Some(Command::Open(2)));
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_command("o 0"), Some(Command::Unknown("o 0".to_string())));
        assert_eq!(parse_command("9"), Some(Command::Unknown("9".to_string())));
        assert_eq!(
            parse_command("t pending"),
            Some(Command::Unknown("t pending".to_string()))
        );
    }

    #[tokio::test]
    async fn test_read_choice() {
        let input: &[u8] = b"1\n2\nyes\n";
        let mut lines = tokio::io::BufReader::new(input).lines();
        assert_eq!(read_choice(&mut lines).await.unwrap(), Choice::Confirm);
        assert_eq!(read_choice(&mut lines).await.unwrap(), Choice::Dismiss);
        assert_eq!(read_choice(&mut lines).await.unwrap(), Choice::Dismiss);
        assert_eq!(read_choice(&mut lines).await.unwrap(), Choice::Dismiss);
    }
}
