use clap::Args;
use serde_json::Value;
use std::fs;

use seller_finance_core::analysis::{analyze, recompute};
use seller_finance_core::export::schedule_csv;
use seller_finance_core::sensitivity::{parse_variable, run_sensitivity as core_run_sensitivity, SensitivityMetric};

use super::DealSourceArgs;
use crate::config::Settings;

/// Arguments for the full comparison
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub deal: DealSourceArgs,
}

/// Arguments for the CSV export
#[derive(Args)]
pub struct ExportCsvArgs {
    #[command(flatten)]
    pub deal: DealSourceArgs,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<String>,
}

/// Arguments for a sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub deal: DealSourceArgs,

    /// First axis as name:min:max:step (e.g. interest_rate:4:9:0.5)
    #[arg(long)]
    pub var1: String,

    /// Optional second axis, same format
    #[arg(long)]
    pub var2: Option<String>,

    /// Figure to report: npv_advantage, npv_financing, npv_all_cash,
    /// monthly_payment, installment_tax_advantage
    #[arg(long, default_value = "npv_advantage")]
    pub metric: String,
}

pub fn run_analyze(args: AnalyzeArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.deal.resolve(settings)?;
    let output = analyze(&inputs)?;
    Ok(serde_json::to_value(output)?)
}

/// Returns the CSV text; empty when it was written to `--out`.
pub fn run_export_csv(
    args: ExportCsvArgs,
    settings: &Settings,
) -> Result<String, Box<dyn std::error::Error>> {
    let inputs = args.deal.resolve(settings)?;
    let csv = schedule_csv(&recompute(&inputs))?;

    match args.out {
        Some(path) => {
            fs::write(&path, &csv).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
            tracing::info!(path = %path, "schedule exported");
            Ok(String::new())
        }
        None => Ok(csv),
    }
}

pub fn run_sensitivity(
    args: SensitivityArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let base = args.deal.resolve(settings)?;
    let var1 = parse_variable(&args.var1)?;
    let var2 = args.var2.as_deref().map(parse_variable).transpose()?;
    let metric: SensitivityMetric = args.metric.parse()?;

    let output = core_run_sensitivity(&base, &var1, var2.as_ref(), metric)?;
    Ok(serde_json::to_value(output)?)
}
