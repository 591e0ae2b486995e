use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use seller_finance_core::amortization::build_schedule;
use seller_finance_core::tax::all_cash::{taxes_all_cash, AllCashTaxInput};
use seller_finance_core::tax::installment::build_installment_taxes;
use seller_finance_core::time_value::npv_monthly;
use seller_finance_core::types::CashFlow;
use seller_finance_core::DealInputs;

use crate::input;

/// Arguments for a standalone amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years (fractions allowed)
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Lump sum due at maturity
    #[arg(long, default_value = "0")]
    pub balloon: Decimal,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct ScheduleInput {
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_years: Decimal,
    #[serde(default)]
    balloon: Decimal,
}

/// Arguments for the all-cash tax calculation
#[derive(Args)]
pub struct TaxAllCashArgs {
    /// Path to JSON/YAML file; either the tax input or a full deal
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the installment tax spread
#[derive(Args)]
pub struct InstallmentTaxArgs {
    /// Path to a JSON/YAML deal; the note schedule is built from it
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for NPV of a monthly cash-flow stream
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct NpvArgs {
    /// Annual discount rate in percent
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Comma-separated amounts for months 0, 1, 2, ...
    #[arg(long, value_delimiter = ',')]
    pub flows: Option<Vec<Decimal>>,

    /// Path to JSON/YAML file: {"discount_rate": .., "cash_flows": [{"month": .., "amount": ..}]}
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct NpvInput {
    discount_rate: Decimal,
    cash_flows: Vec<CashFlow>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sched_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if args.principal.is_none() {
        let data = input::stdin::read_stdin()?
            .ok_or("--principal is required (or provide --input)")?;
        serde_json::from_value(data)?
    } else {
        ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.years.ok_or("--years is required (or provide --input)")?,
            balloon: args.balloon,
        }
    };

    let schedule = build_schedule(
        sched_input.principal,
        sched_input.annual_rate_pct,
        sched_input.term_years,
        sched_input.balloon,
    );

    Ok(json!({
        "payment": schedule.payment,
        "term_months": schedule.term_months(),
        "total_paid": schedule.total_paid(),
        "total_interest": schedule.total_interest(),
        "rows": schedule.rows,
    }))
}

pub fn run_tax_all_cash(args: TaxAllCashArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = read_document(args.input.as_deref())?;

    let tax_input = match data {
        Some(value) if value.get("ltcg_rate").is_some() => {
            serde_json::from_value::<AllCashTaxInput>(value)?
        }
        Some(value) => DealInputs::from_value_lenient(&value, &DealInputs::default())
            .sanitized()
            .all_cash_tax_input(),
        None => DealInputs::default().all_cash_tax_input(),
    };

    let taxes = taxes_all_cash(&tax_input);
    let mut value = serde_json::to_value(&taxes)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("net_proceeds".into(), json!(taxes.net_proceeds()));
        map.insert("effective_rate".into(), json!(taxes.effective_rate()));
    }
    Ok(value)
}

pub fn run_tax_installment(args: InstallmentTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal = match read_document(args.input.as_deref())? {
        Some(value) => DealInputs::from_value_lenient(&value, &DealInputs::default()),
        None => DealInputs::default(),
    }
    .sanitized();

    let schedule = build_schedule(
        deal.loan_principal(),
        deal.interest_rate,
        deal.term_years,
        deal.balloon,
    );
    let taxes = build_installment_taxes(&schedule.rows, &deal.installment_tax_input());
    Ok(serde_json::to_value(taxes)?)
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let npv_input: NpvInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(flows) = args.flows {
        NpvInput {
            discount_rate: args
                .discount_rate
                .ok_or("--discount-rate is required (or provide --input)")?,
            cash_flows: flows
                .into_iter()
                .zip(0u32..)
                .map(|(amount, month)| CashFlow::new(month, amount))
                .collect(),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--flows or --input is required for npv".into());
    };

    let npv = npv_monthly(&npv_input.cash_flows, npv_input.discount_rate);
    Ok(json!({
        "discount_rate": npv_input.discount_rate,
        "flow_count": npv_input.cash_flows.len(),
        "npv": npv,
    }))
}

fn read_document(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(input::file::read_json_value(p)?)),
        None => input::stdin::read_stdin(),
    }
}
