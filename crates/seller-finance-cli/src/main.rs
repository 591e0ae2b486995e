mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use commands::deal::{AnalyzeArgs, ExportCsvArgs, SensitivityArgs};
use commands::engine::{InstallmentTaxArgs, NpvArgs, ScheduleArgs, TaxAllCashArgs};
use commands::scenario::ScenarioCommand;
use commands::share::ShareCommand;
use config::Settings;

/// Seller financing vs all-cash sale calculator
#[derive(Parser)]
#[command(
    name = "sfc",
    version,
    about = "Compare seller financing against an all-cash sale",
    long_about = "Builds the seller's note amortization schedule, spreads the sale's tax \
                  with the installment method, and compares both outcomes on a monthly \
                  NPV basis. Deals can be read from JSON/YAML files, stdin, share links, \
                  or saved scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Directory holding saved scenarios (overrides SFC_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an amortization schedule (optionally with a balloon)
    Schedule(ScheduleArgs),
    /// Tax on an outright all-cash sale
    TaxAllCash(TaxAllCashArgs),
    /// Installment-method tax spread across a note's schedule
    TaxInstallment(InstallmentTaxArgs),
    /// Net present value of a monthly cash-flow stream
    Npv(NpvArgs),
    /// Full seller-financing vs all-cash comparison
    Analyze(AnalyzeArgs),
    /// Write the schedule and tax timeline as CSV
    ExportCsv(ExportCsvArgs),
    /// Sweep one or two deal inputs and report a headline figure
    Sensitivity(SensitivityArgs),
    /// Encode or decode sharable deal links
    #[command(subcommand)]
    Share(ShareCommand),
    /// Save, list, show or delete named scenarios
    #[command(subcommand)]
    Scenario(ScenarioCommand),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let settings = match Settings::resolve(cli.data_dir.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    tracing::debug!(data_dir = %settings.data_dir().display(), "settings resolved");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::engine::run_schedule(args),
        Commands::TaxAllCash(args) => commands::engine::run_tax_all_cash(args),
        Commands::TaxInstallment(args) => commands::engine::run_tax_installment(args),
        Commands::Npv(args) => commands::engine::run_npv(args),
        Commands::Analyze(args) => commands::deal::run_analyze(args, &settings),
        Commands::Sensitivity(args) => commands::deal::run_sensitivity(args, &settings),
        Commands::Share(cmd) => commands::share::run_share(cmd, &settings),
        Commands::Scenario(cmd) => commands::scenario::run_scenario(cmd, &settings),
        Commands::ExportCsv(args) => {
            match commands::deal::run_export_csv(args, &settings) {
                Ok(csv) => {
                    print!("{}", csv);
                    process::exit(0);
                }
                Err(e) => Err(e),
            }
        }
        Commands::Version => {
            println!("sfc {}", env!("CARGO_PKG_VERSION"));
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
