use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use deps_scanner::cli::{FAILURE_EXIT_CODE, parse_args};
use deps_scanner::config::GitLabConfig;
use deps_scanner::gitlab::{GitLabClient, NoteAction};

#[derive(Parser)]
#[command(name = "comment-gitlab")]
#[command(version, about = "Post a report as a note on a GitLab merge request")]
struct Cli {
    #[command(flatten)]
    gitlab: GitLabConfig,

    /// Files whose contents form the report; stdin is read when none are given
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    let _guard = deps_scanner::logging::init();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run(&cli)));

    match result {
        Ok(NoteAction::Created { id }) => {
            eprintln!("Created note {}", id);
            ExitCode::SUCCESS
        }
        Ok(NoteAction::Updated { id }) => {
            eprintln!("Updated note {}", id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<NoteAction> {
    let report = read_report(&cli.files)?;
    info!("Posting report of {} bytes", report.len());
    let client = GitLabClient::new(&cli.gitlab).context("Failed to build GitLab client")?;

    client
        .upsert_report(&report)
        .await
        .context("Failed to post report")
}

fn read_report(files: &[PathBuf]) -> anyhow::Result<String> {
    if files.is_empty() {
        let mut report = String::new();
        std::io::stdin()
            .read_to_string(&mut report)
            .context("Failed to read report from stdin")?;
        return Ok(report);
    }

    let mut report = String::new();
    for path in files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        report.push_str(&content);
    }
    Ok(report)
}
