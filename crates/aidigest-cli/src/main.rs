mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "aidigest-cli")]
#[command(about = "Daily AI trend digest command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Produce (or return) the digest for a date.
    Run {
        /// Digest date, YYYY-MM-DD. Defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Rebuild and replace an existing digest for the date.
        #[arg(long)]
        force: bool,
        /// Deliver the finished digest to the configured webhook.
        #[arg(long)]
        notify: bool,
    },
    /// List recent digests.
    History {
        #[arg(long, default_value_t = 14)]
        limit: i64,
    },
    /// List recent run-ledger entries.
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            date,
            force,
            notify,
        } => commands::run_digest(date, force, notify).await,
        Commands::History { limit } => commands::show_history(limit).await,
        Commands::Logs { limit } => commands::show_logs(limit).await,
    }
}
