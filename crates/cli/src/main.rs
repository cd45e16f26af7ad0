//! Pantry CLI - back-office reorder and approval tools.
//!
//! # Usage
//!
//! ```bash
//! # Items of master list 4 that need reordering
//! pantry master-list show 4 --min-reorder 1
//!
//! # Order every selected item from supplier 9
//! pantry master-list assign-supplier 4 --supplier 9 12 13 14
//!
//! # Pending submissions, newest first
//! pantry submissions list
//!
//! # Reject two lists with one reason
//! pantry submissions reject 31 32 --message "estoque suficiente"
//! ```
//!
//! # Commands
//!
//! - `master-list` - Reorder view, thresholds, supplier assignment, copy/move
//! - `orders` - Review purchase orders
//! - `submissions` - Approval workflow and checklist export
//!
//! Results are printed to stdout as JSON; logs go to stderr. Bulk commands
//! report partial failures and exit non-zero only if nothing succeeded.
//! Ctrl+C stops a bulk command and reports the unfinished ids.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::replenishment::{MasterListAction, OrderAction};
use commands::submissions::SubmissionAction;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(author, version, about = "Pantry back-office tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Master lists and their stock items
    MasterList {
        #[command(subcommand)]
        action: MasterListAction,
    },
    /// Purchase order review
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Submitted lists (traditional and quick)
    Submissions {
        #[command(subcommand)]
        action: SubmissionAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pantry_cli=info,pantry_admin=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var_os("PANTRY_LOG_JSON").is_some() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::from_env()?;
    match cli.command {
        Commands::MasterList { action } => commands::replenishment::master_list(&ctx, action).await,
        Commands::Orders { action } => commands::replenishment::orders(&ctx, action).await,
        Commands::Submissions { action } => commands::submissions::run(&ctx, action).await,
    }
}
