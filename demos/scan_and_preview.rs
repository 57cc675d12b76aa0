//! Example: Scan a channel and preview what a purge would delete.
//!
//! Nothing is deleted: the purge runs in dry-run mode and prints the first
//! few matches.
//!
//! # Usage
//!
//! ```bash
//! export DISCORD_TOKEN="your-user-token"
//! export CHANNEL_ID="900000000000000000"
//! # Optional: only messages containing this text
//! export CONTENT="oops"
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=discord_purge=debug
//!
//! cargo run --example scan_and_preview
//! ```

use discord_purge::credentials::CredentialResolver;
use discord_purge::observer::{NoopObserver, Preconfirmed};
use discord_purge::{ClientConfig, MessageReference, PurgeOptions, Session, Snowflake};
use std::env;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> discord_purge::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("discord_purge=info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .init();

    // token.txt, then DISCORD_TOKEN
    let token = CredentialResolver::new().resolve(|| {
        Err(discord_purge::Error::InvalidCredential {
            reason: "set DISCORD_TOKEN or create token.txt".into(),
        })
    })?;
    let channel = Snowflake::parse(
        &env::var("CHANNEL_ID").expect("CHANNEL_ID environment variable required"),
    )?;

    let config = ClientConfig::builder().secret_token(token).build()?;
    let session = Session::connect(config).await?;
    println!("Signed in as {}", session.identity().display_name);

    let mut query = session.query().channel(channel);
    if let Ok(text) = env::var("CONTENT") {
        query = query.content(text);
    }
    let query = query.build()?;

    let mut on_batch = |batch: &[MessageReference]| {
        println!("  ...{} more", batch.len());
    };
    let scan = session.scan(&query, &mut on_batch).await?;
    println!(
        "Found {} messages over {} pages ({:?})",
        scan.messages.len(),
        scan.pages,
        scan.end
    );

    let options = PurgeOptions {
        dry_run: true,
        ..PurgeOptions::default()
    };
    let summary = session
        .purge(&scan.messages, options, &Preconfirmed, &mut NoopObserver)
        .await;

    println!("\nWould delete {}:", summary.total);
    for item in &summary.preview {
        println!("  [{}] {}", item.id, item.excerpt);
    }

    Ok(())
}
