//! `discord-purge`: find your messages in a server or channel and delete them.
//!
//! ```bash
//! # Preview what would be deleted
//! discord-purge --channel 900000000000000000 --content "oops" --dry-run
//!
//! # Delete everything you said in a server during 2021
//! discord-purge --guild 800000000000000000 --after 2021-01-01 --before 2022-01-01
//! ```
//!
//! The token is read from `token.txt`, then `DISCORD_TOKEN`, then prompted
//! for. Log verbosity follows `RUST_LOG` (default `discord_purge=info`).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{ArgGroup, Parser};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Password};
use discord_purge::credentials::{CredentialResolver, DEFAULT_TOKEN_FILE};
use discord_purge::observer::{Preconfirmed, PurgeProgress};
use discord_purge::{
    CancellationToken, ClientConfig, MessageReference, PurgeOptions, PurgeStatus, ScanEnd,
    ScanResult, Session, Snowflake,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Find and delete your own Discord messages", long_about = None)]
#[command(group(ArgGroup::new("scope").required(true).args(["guild", "channel"])))]
struct Args {
    /// Server to search
    #[arg(long)]
    guild: Option<Snowflake>,

    /// Channel or DM to search
    #[arg(long)]
    channel: Option<Snowflake>,

    /// Author to search for (defaults to the logged-in account)
    #[arg(long)]
    author: Option<Snowflake>,

    /// Only messages containing this text
    #[arg(long)]
    content: Option<String>,

    /// Only messages sent on or after this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    after: Option<NaiveDate>,

    /// Only messages sent before this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    before: Option<NaiveDate>,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// File holding the user token
    #[arg(long, default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,

    /// Write the scan results to this file as JSON
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] discord_purge::Error),

    #[error("failed to export scan to {}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize scan results")]
    Serialize(#[from] serde_json::Error),

    #[error("interactive prompt did not complete")]
    Prompt(#[from] tokio::task::JoinError),
}

/// What to do once a scan has returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterScan {
    /// Interrupted; whatever was found is not acted on.
    Cancelled,
    /// Nothing matched.
    Empty,
    /// Hand the results to the purge.
    Proceed,
}

impl AfterScan {
    fn decide(scan: &ScanResult, cancelled: bool) -> Self {
        if cancelled {
            AfterScan::Cancelled
        } else if scan.messages.is_empty() {
            AfterScan::Empty
        } else {
            AfterScan::Proceed
        }
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn prompt_token() -> discord_purge::Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("User token")
        .interact()
        .map_err(|e| discord_purge::Error::InvalidCredential {
            reason: format!("token prompt failed: {e}"),
        })
}

fn confirm_purge(count: usize) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Delete {count} messages? This cannot be undone"))
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn export_scan(path: &Path, scan: &ScanResult) -> Result<(), CliError> {
    let json = serde_json::to_vec_pretty(scan)?;
    std::fs::write(path, json).map_err(|source| CliError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), messages = scan.messages.len(), "Scan exported");
    Ok(())
}

async fn run(args: Args) -> Result<ExitCode, CliError> {
    warn!("Automating a user account breaks the platform's terms of service, use at your own risk");

    // Prompts block, keep them off the async workers
    let resolver = CredentialResolver::new().file(&args.token_file);
    let token = tokio::task::spawn_blocking(move || resolver.resolve(prompt_token)).await??;
    let config = ClientConfig::builder().secret_token(token).build()?;

    let stop = CancellationToken::new();
    let signal = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current request");
            signal.cancel();
        }
    });

    let session = Session::connect(config).await?.with_stop_signal(stop.clone());
    info!(
        account_id = %session.identity().account_id,
        "Logged in as {}",
        session.identity().display_name
    );

    let mut query = session.query();
    if let Some(id) = args.guild {
        query = query.guild(id);
    }
    if let Some(id) = args.channel {
        query = query.channel(id);
    }
    if let Some(id) = args.author {
        query = query.author(id);
    }
    if let Some(text) = args.content {
        query = query.content(text);
    }
    if let Some(day) = args.after {
        query = query.after(start_of_day(day));
    }
    if let Some(day) = args.before {
        query = query.before(start_of_day(day));
    }
    let query = query.build()?;

    let mut found = 0;
    let mut on_batch = |batch: &[MessageReference]| {
        found += batch.len();
        info!(found, "Scanning");
    };
    let scan = session.scan(&query, &mut on_batch).await?;

    match &scan.end {
        ScanEnd::Failed { detail, .. } => {
            warn!(detail = %detail, "Scan stopped early, results are partial");
        }
        ScanEnd::Cancelled => warn!("Scan cancelled, results are partial"),
        ScanEnd::Exhausted | ScanEnd::ReachedTotal => {}
    }

    if let Some(path) = &args.export {
        export_scan(path, &scan)?;
    }

    match AfterScan::decide(&scan, stop.is_cancelled()) {
        AfterScan::Cancelled => return Ok(ExitCode::FAILURE),
        AfterScan::Empty => {
            info!("No messages found matching criteria");
            return Ok(ExitCode::SUCCESS);
        }
        AfterScan::Proceed => {}
    }

    let count = scan.messages.len();
    println!("Found {count} messages.");

    if !args.dry_run && !args.yes {
        let confirmed = tokio::task::spawn_blocking(move || confirm_purge(count)).await?;
        if !confirmed {
            println!("Nothing deleted.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    // Confirmation, when required, has already been given above
    let options = PurgeOptions {
        dry_run: args.dry_run,
        require_confirmation: false,
    };
    let mut on_progress = |p: PurgeProgress| {
        info!(
            deleted = p.deleted,
            failed = p.failed,
            total = p.total,
            "Progress"
        );
    };
    let summary = session
        .purge(&scan.messages, options, &Preconfirmed, &mut on_progress)
        .await;

    match summary.status {
        PurgeStatus::DryRun => {
            println!("Dry run, nothing deleted. First messages:");
            for item in &summary.preview {
                println!("  [{}] {}", item.id, item.excerpt);
            }
            Ok(ExitCode::SUCCESS)
        }
        PurgeStatus::Declined => {
            println!("Nothing deleted.");
            Ok(ExitCode::SUCCESS)
        }
        PurgeStatus::Completed => {
            println!(
                "Done. Deleted {}, failed {}, total {}.",
                summary.deleted, summary.failed, summary.total
            );
            Ok(ExitCode::SUCCESS)
        }
        PurgeStatus::Cancelled => {
            println!(
                "Stopped. Deleted {} of {} before cancelling.",
                summary.deleted, summary.total
            );
            Ok(ExitCode::FAILURE)
        }
        PurgeStatus::Unauthorized => {
            error!(
                deleted = summary.deleted,
                "Token was rejected mid-purge, remaining messages were skipped"
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("discord_purge=info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "discord-purge failed");
            ExitCode::FAILURE
        }
    }
}
