use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;

use rollcall_core::clock::offset_from_hours;
use rollcall_core::{CheckTime, RollcallConfig};
use rollcall_job::{run_daily, JobError, RunOptions};
use rollcall_mailer::SmtpRelay;
use rollcall_store::SupabaseStore;

const DEFAULT_LOG_FILTER: &str = "rollcall=info,rollcall_job=info,rollcall_mailer=info,rollcall_store=info";

/// Email guardians of students who have not checked in today.
///
/// Meant to be started once a day by an external scheduler. Needs
/// SUPABASE_URL, SUPABASE_KEY, SENDER_EMAIL and SENDER_PASSWORD.
#[derive(Debug, Parser)]
#[command(name = "rollcall", version)]
struct Cli {
    /// TOML config file (default: ROLLCALL_CONFIG, then ./rollcall.toml).
    #[arg(long)]
    config: Option<String>,

    /// Evaluate a specific local date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Log the notices that would be sent; send nothing and write nothing.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let cli = Cli::parse();

    // config: --config > ROLLCALL_CONFIG env > ./rollcall.toml
    let config_path = cli.config.or_else(|| std::env::var("ROLLCALL_CONFIG").ok());
    let config = RollcallConfig::load(config_path.as_deref()).map_err(JobError::Config)?;

    let offset = offset_from_hours(config.notice.utc_offset_hours).map_err(JobError::Config)?;
    let check = match cli.date {
        Some(date) => CheckTime::for_date(date, offset),
        None => CheckTime::now(offset),
    };

    // one backend handle and one relay for the whole run
    let store = SupabaseStore::new(&config.backend).map_err(JobError::Backend)?;
    let relay = SmtpRelay::new(&config.mail).context("invalid sender address")?;

    let opts = RunOptions {
        check,
        labels: config.notice.clone(),
        dry_run: cli.dry_run,
    };
    let summary = run_daily(&store, &relay, &opts).await?;

    info!(
        sent = summary.sent,
        skipped = summary.skipped,
        failed = summary.failed,
        "run complete"
    );
    Ok(())
}
