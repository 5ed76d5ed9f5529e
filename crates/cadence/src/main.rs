// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cadence - a local-first planner for content creators.
//!
//! This is the binary entry point. Every subcommand opens the configured
//! document store, mounts the feature it needs, and exits.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod billing;
mod board;
mod calendar;
mod collab;
mod content;
mod output;
mod planner;
mod tasks;
mod watch;

use std::io::IsTerminal;
use std::path::PathBuf;

use cadence_config::CadenceConfig;
use cadence_features::AppContext;
use clap::{Parser, Subcommand};

use crate::output::Printer;

/// Cadence - a local-first planner for content creators.
#[derive(Parser, Debug)]
#[command(name = "cadence", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Daily planner items.
    Planner {
        #[command(subcommand)]
        action: planner::PlannerCommand,
    },
    /// The all-tasks list.
    Tasks {
        #[command(subcommand)]
        action: tasks::TasksCommand,
    },
    /// Content calendar ideas.
    Content {
        #[command(subcommand)]
        action: content::ContentCommand,
    },
    /// Production board cards.
    Board {
        #[command(subcommand)]
        action: board::BoardCommand,
    },
    /// Brand collab table.
    Collab {
        #[command(subcommand)]
        action: collab::CollabCommand,
    },
    /// Google Calendar connection.
    Calendar {
        #[command(subcommand)]
        action: calendar::CalendarCommand,
    },
    /// Subscription billing.
    Billing {
        #[command(subcommand)]
        action: billing::BillingCommand,
    },
    /// Wait until an email address is verified.
    Verify { email: String },
    /// Print changes made by other processes until interrupted.
    Watch,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => cadence_config::load_and_validate_path(path),
        None => cadence_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            cadence_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let printer = Printer::new(!cli.plain && std::io::stdout().is_terminal());
    if let Err(e) = run(cli.command, &config, &printer).await {
        printer.error(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: &CadenceConfig,
    printer: &Printer,
) -> Result<(), cadence_core::CadenceError> {
    let ctx = AppContext::open(config)?;
    match command {
        Commands::Planner { action } => planner::run(&ctx, action, printer),
        Commands::Tasks { action } => tasks::run(&ctx, action, printer),
        Commands::Content { action } => content::run(&ctx, action, printer),
        Commands::Board { action } => board::run(&ctx, action, printer),
        Commands::Collab { action } => collab::run(&ctx, action, printer),
        Commands::Calendar { action } => calendar::run(&ctx, config, action, printer).await,
        Commands::Billing { action } => billing::run(config, action, printer).await,
        Commands::Verify { email } => billing::run_verify(config, &email, printer).await,
        Commands::Watch => watch::run_watch(&ctx, config, printer).await,
    }
}

/// Initialize the tracing subscriber with the configured log level.
///
/// Logs go to stderr so command output on stdout stays scriptable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cadence={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
