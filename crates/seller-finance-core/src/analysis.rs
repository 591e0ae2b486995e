use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{build_schedule, Schedule};
use crate::inputs::{DealInputs, MAX_SHARE_PERCENT};
use crate::tax::all_cash::{taxes_all_cash, AllCashTaxes};
use crate::tax::installment::{build_installment_taxes, InstallmentTaxes};
use crate::time_value::{monthly_rate, npv_monthly};
use crate::types::{with_metadata, years_to_months, CashFlow, ComputationOutput, Money, Month};
use crate::CalcResult;

/// Longest reinvestment horizon credited to the all-cash leg.
const MAX_REINVEST_MONTHS: Month = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The all-cash side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllCashLeg {
    pub taxes: AllCashTaxes,
    /// Amount realized less all-cash tax
    pub net_proceeds: Money,
    /// Portion of net proceeds withheld at closing
    pub holdback_amount: Money,
    pub holdback_release_month: Month,
    /// Net proceeds available at closing
    pub immediate_proceeds: Money,
    /// Monthly yield on the immediate proceeds
    pub monthly_reinvestment_interest: Money,
    pub reinvestment_months: Month,
    pub reinvestment_interest_total: Money,
    pub cash_flows: Vec<CashFlow>,
    pub npv: Money,
}

/// The seller-financing side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingLeg {
    pub down_payment: Money,
    pub loan_principal: Money,
    pub monthly_payment: Money,
    pub schedule: Schedule,
    pub taxes: InstallmentTaxes,
    pub total_payments: Money,
    pub total_interest: Money,
    pub cash_flows: Vec<CashFlow>,
    pub npv: Money,
}

/// Everything derived from one set of deal inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedResult {
    pub all_cash: AllCashLeg,
    pub financing: FinancingLeg,
    /// Financing NPV minus all-cash NPV; either side may come out ahead
    pub npv_advantage: Money,
    /// Installment tax stream discounted at the comparison rate
    pub pv_installment_taxes: Money,
    /// All-cash tax (undiscounted) minus the discounted installment taxes
    pub installment_tax_advantage: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Recompute every derived figure from scratch.
///
/// Pure and total: inputs are sanitized first, nothing is cached, and the
/// returned value is independent of any earlier call.
pub fn recompute(inputs: &DealInputs) -> DerivedResult {
    let inputs = inputs.sanitized();

    let all_cash = all_cash_leg(&inputs);
    let financing = financing_leg(&inputs);

    let tax_flows: Vec<CashFlow> = financing
        .taxes
        .rows
        .iter()
        .map(|r| CashFlow::new(r.month, r.total()))
        .collect();
    let pv_installment_taxes = npv_monthly(&tax_flows, inputs.discount_rate);

    DerivedResult {
        npv_advantage: financing.npv - all_cash.npv,
        installment_tax_advantage: all_cash.taxes.total_tax - pv_installment_taxes,
        pv_installment_taxes,
        all_cash,
        financing,
    }
}

/// Run `recompute` and wrap it in the standard output envelope, flagging
/// inputs that produce a degenerate or suspicious comparison.
pub fn analyze(inputs: &DealInputs) -> CalcResult<ComputationOutput<DerivedResult>> {
    let start = Instant::now();

    let result = recompute(inputs);
    let warnings = collect_warnings(inputs, &inputs.sanitized(), &result);

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Seller financing vs all-cash sale (installment method, monthly NPV)",
        inputs,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Legs
// ---------------------------------------------------------------------------

fn all_cash_leg(inputs: &DealInputs) -> AllCashLeg {
    let taxes = taxes_all_cash(&inputs.all_cash_tax_input());
    let net_proceeds = taxes.net_proceeds();

    let holdback_amount = net_proceeds * inputs.holdback_pct / dec!(100);
    let holdback_release_month = inputs.holdback_release_months;
    let immediate_proceeds = net_proceeds - holdback_amount;

    let reinvestment_months = years_to_months(inputs.reinvest_years, MAX_REINVEST_MONTHS);
    let monthly_reinvestment_interest = immediate_proceeds * monthly_rate(inputs.reinvest_rate);

    let mut cash_flows = Vec::with_capacity(reinvestment_months as usize + 2);
    cash_flows.push(CashFlow::new(0, immediate_proceeds));
    cash_flows.extend(
        (1..=reinvestment_months).map(|m| CashFlow::new(m, monthly_reinvestment_interest)),
    );
    if !holdback_amount.is_zero() {
        cash_flows.push(CashFlow::new(holdback_release_month, holdback_amount));
    }

    let npv = npv_monthly(&cash_flows, inputs.discount_rate);

    AllCashLeg {
        taxes,
        net_proceeds,
        holdback_amount,
        holdback_release_month,
        immediate_proceeds,
        monthly_reinvestment_interest,
        reinvestment_months,
        reinvestment_interest_total: monthly_reinvestment_interest
            * Decimal::from(reinvestment_months),
        cash_flows,
        npv,
    }
}

fn financing_leg(inputs: &DealInputs) -> FinancingLeg {
    let down_payment = inputs.down_payment();
    let loan_principal = inputs.loan_principal();

    let schedule = build_schedule(
        loan_principal,
        inputs.interest_rate,
        inputs.term_years,
        inputs.balloon,
    );
    let taxes = build_installment_taxes(&schedule.rows, &inputs.installment_tax_input());

    let mut cash_flows = Vec::with_capacity(1 + schedule.rows.len() + taxes.rows.len());
    cash_flows.push(CashFlow::new(0, down_payment));
    cash_flows.extend(schedule.rows.iter().map(|r| CashFlow::new(r.month, r.payment)));
    cash_flows.extend(taxes.rows.iter().map(|r| CashFlow::new(r.month, -r.total())));

    let npv = npv_monthly(&cash_flows, inputs.discount_rate);

    FinancingLeg {
        down_payment,
        loan_principal,
        monthly_payment: schedule.payment,
        total_payments: schedule.total_paid(),
        total_interest: schedule.total_interest(),
        schedule,
        taxes,
        cash_flows,
        npv,
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// `raw` is the deal as supplied; `inputs` is its sanitized copy.
fn collect_warnings(raw: &DealInputs, inputs: &DealInputs, result: &DerivedResult) -> Vec<String> {
    let mut warnings = Vec::new();
    let financing = &result.financing;

    if financing.schedule.rows.is_empty() && financing.loan_principal > Decimal::ZERO {
        warnings.push(format!(
            "Term of {} years rounds to zero months; no note payments are scheduled",
            inputs.term_years
        ));
    }

    if inputs.balloon > Decimal::ZERO && inputs.balloon > financing.loan_principal {
        warnings.push(format!(
            "Balloon {} exceeds the financed principal {}; schedule is not meaningful",
            inputs.balloon, financing.loan_principal
        ));
    }

    if financing.monthly_payment < Decimal::ZERO {
        warnings.push(format!(
            "Monthly payment is negative ({:.2}); check balloon and term",
            financing.monthly_payment
        ));
    }

    if raw.down_payment_pct > MAX_SHARE_PERCENT {
        warnings.push(format!(
            "Down payment {}% exceeds the sale price; capped at 100%, nothing is financed",
            raw.down_payment_pct
        ));
    }

    if raw.holdback_pct > MAX_SHARE_PERCENT {
        warnings.push(format!(
            "Holdback {}% exceeds the net proceeds; capped at 100%",
            raw.holdback_pct
        ));
    }

    if inputs.discount_rate.is_zero() {
        warnings.push("Discount rate is 0%; NPVs equal undiscounted totals".into());
    }

    if inputs.holdback_release_months > 0
        && result.all_cash.holdback_amount > Decimal::ZERO
        && inputs.holdback_release_months > result.all_cash.reinvestment_months
        && result.all_cash.reinvestment_months > 0
    {
        warnings.push(format!(
            "Holdback releases in month {}, after the {}-month reinvestment horizon",
            inputs.holdback_release_months, result.all_cash.reinvestment_months
        ));
    }

    warnings
}
