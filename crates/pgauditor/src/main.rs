//! pgauditor CLI
//!
//! Prints change-auditing DDL for one PostgreSQL table to stdout.

use std::io::Write;

use clap::Parser;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use pgauditor::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so stdout carries only the script
    let log_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!(?config, "Configuration");

    let catalog = PgCatalog::connect(&config.connection()).await?;
    let result = pgauditor::run(&config, &catalog).await;
    catalog.close().await;

    let rendered = result?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
