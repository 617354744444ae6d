mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::chat::ChatArgs;
use commands::schedule::ScheduleArgs;
use commands::tiers::TiersArgs;

/// Tiered-rate loan amortization simulator
#[derive(Parser)]
#[command(
    name = "loansim",
    version,
    about = "Tiered-rate loan amortization simulator",
    long_about = "Compute level-payment amortization schedules priced from a tiered \
                  rate table, or run the interactive chat simulator in the terminal."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute an amortization schedule for a principal and term
    Schedule(ScheduleArgs),
    /// Show the rate tier table
    Tiers(TiersArgs),
    /// Run the conversational simulator on stdin/stdout
    Chat(ChatArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    /// The message the chat bot would send
    Chat,
}

fn init_tracing() {
    // stdout carries results; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loansim=info,loan_sim_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Tiers(args) => commands::tiers::run_tiers(args),
        Commands::Chat(args) => match commands::chat::run_chat(args) {
            Ok(()) => process::exit(0),
            Err(e) => Err(e),
        },
        Commands::Version => {
            println!("loansim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
