mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::deal::UnderwriteArgs;
use commands::loan::{BalanceArgs, PaymentArgs};

/// Underwriting for NNN real-estate acquisitions
#[derive(Parser)]
#[command(
    name = "deals",
    version,
    about = "Underwriting for NNN real-estate acquisitions",
    long_about = "Derives acquisition, operating, financing and exit metrics \
                  (NOI, debt service, DSCR, cap rate, cash-on-cash, equity multiple) \
                  for a deal record, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log sentinel and fallback decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Underwrite a deal record (JSON or YAML file, or JSON on stdin)
    Underwrite(UnderwriteArgs),
    /// Level monthly payment on a fixed-rate loan
    Payment(PaymentArgs),
    /// Outstanding loan balance after a number of monthly payments
    Balance(BalanceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_directives = if verbose {
        "deal_tracker_core=debug,deal_tracker_cli=debug"
    } else {
        "deal_tracker_core=warn,deal_tracker_cli=warn"
    };

    // stdout carries the report; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Underwrite(args) => commands::deal::run_underwrite(args),
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Balance(args) => commands::loan::run_balance(args),
        Commands::Version => {
            println!("deals {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
