mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::metrics::MetricsArgs;
use commands::returns::{IrrArgs, MeansArgs, TwrArgs};

/// Portfolio return metrics with decimal precision
#[derive(Parser)]
#[command(
    name = "pmet",
    version,
    about = "Portfolio return metrics with decimal precision",
    long_about = "Computes money-weighted (IRR) and time-weighted (TWR) returns for a \
                  multi-period investment account, along with arithmetic and geometric \
                  mean period returns, balance projections, and cash-flow series."
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
    /// Compute all return metrics from per-period inputs
    Metrics(MetricsArgs),
    /// Solve the internal rate of return for a cash-flow series
    Irr(IrrArgs),
    /// Chain per-period returns into a time-weighted return
    Twr(TwrArgs),
    /// Arithmetic and geometric mean of period returns
    Means(MeansArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Irr(args) => commands::returns::run_irr(args),
        Commands::Twr(args) => commands::returns::run_twr(args),
        Commands::Means(args) => commands::returns::run_means(args),
        Commands::Version => {
            println!("pmet {}", env!("CARGO_PKG_VERSION"));
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
