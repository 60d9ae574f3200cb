mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::AnalyzeArgs;
use commands::history::HistoryArgs;
use commands::plan::PlanArgs;
use commands::projection::ProjectArgs;
use commands::simulations::{CompareArgs, SimulationsArgs};
use commands::statement::{StatementArgs, YearlyArgs};

/// Business-plan projections, income statements and yearly roll-ups
#[derive(Parser)]
#[command(
    name = "bizplan",
    version,
    about = "Business-plan projections, income statements and yearly roll-ups",
    long_about = "A CLI for projecting revenue, cost and inventory with decimal precision. \
                  Derives per-period summary income statements, rolls them up by year \
                  with year-over-year change and channel drill-down, and keeps named \
                  plan snapshots for comparison."
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
    /// Project monthly revenue, cost and inventory from a base and growth rates
    Project(ProjectArgs),
    /// Turn planning entries into projected records and statements
    Plan(PlanArgs),
    /// Derive summary income statements from period records
    Statement(StatementArgs),
    /// Roll statements up by year with YoY change and drill-down
    Yearly(YearlyArgs),
    /// Load historical actuals, falling back to sample data
    History(HistoryArgs),
    /// Ask for a written analysis of historical actuals
    Analyze(AnalyzeArgs),
    /// List, save or delete saved simulations
    Simulations(SimulationsArgs),
    /// Compare two or more saved simulations
    Compare(CompareArgs),
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
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::Plan(args) => commands::plan::run_plan_cmd(args),
        Commands::Statement(args) => commands::statement::run_statement(args),
        Commands::Yearly(args) => commands::statement::run_yearly(args),
        Commands::History(args) => commands::history::run_history(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Simulations(args) => commands::simulations::run_simulations(args),
        Commands::Compare(args) => commands::simulations::run_compare(args),
        Commands::Version => {
            println!("bizplan {}", env!("CARGO_PKG_VERSION"));
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
