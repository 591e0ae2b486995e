use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{amount_realized, combined_rate, recapture};
use crate::amortization::AmortizationRow;
use crate::types::{clamp_money, floor_zero, Money, Month, Percent};

/// Inputs for taxing a seller-financed (installment) sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentTaxInput {
    pub price: Money,
    pub selling_costs: Money,
    pub basis: Money,
    pub recapture_amount: Money,
    pub recapture_rate: Percent,
    pub ltcg_rate: Percent,
    pub state_gain_rate: Percent,
    /// Federal ordinary income rate, applied to note interest
    pub ordinary_rate: Percent,
    pub state_ordinary_rate: Percent,
}

/// Tax recognized in one month of the installment timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRow {
    pub month: Month,
    pub cap_gain_tax: Money,
    pub interest_tax: Money,
    /// Non-zero only on the month-0 row
    pub recapture_tax: Money,
}

impl TaxRow {
    pub fn total(&self) -> Money {
        self.cap_gain_tax + self.interest_tax + self.recapture_tax
    }
}

/// Installment-method tax timeline and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentTaxes {
    /// Month-0 recapture row followed by one row per amortization row
    pub rows: Vec<TaxRow>,
    pub gross_profit: Money,
    pub gross_profit_ratio: Decimal,
    pub total_cap_gain_tax: Money,
    pub total_interest_tax: Money,
    pub recapture_tax: Money,
    pub total_tax: Money,
}

/// Spread the sale's tax over the note using the gross profit ratio.
///
/// Recapture is not eligible for deferral and lands entirely on a month-0
/// row. Every amortization row then recognizes `principal x GPR` of capital
/// gain at the combined gains rate, while its interest is ordinary income
/// taxed at the combined ordinary rate in the month it is received.
///
/// GPR = max(0, amount realized - basis - recapture) / amount realized,
/// or zero when nothing is realized.
pub fn build_installment_taxes(
    schedule: &[AmortizationRow],
    input: &InstallmentTaxInput,
) -> InstallmentTaxes {
    let amount_realized = amount_realized(input.price, input.selling_costs);
    let basis = clamp_money(input.basis);

    let gain = floor_zero(amount_realized - basis);
    let (_, recapture_tax) = recapture(gain, input.recapture_amount, input.recapture_rate);

    let gross_profit =
        floor_zero(amount_realized - basis - clamp_money(input.recapture_amount));
    let contract_price = amount_realized;
    let gross_profit_ratio = if contract_price > Decimal::ZERO {
        gross_profit / contract_price
    } else {
        Decimal::ZERO
    };

    let gain_rate = combined_rate(input.ltcg_rate, input.state_gain_rate);
    let ordinary_rate = combined_rate(input.ordinary_rate, input.state_ordinary_rate);

    let mut rows = Vec::with_capacity(schedule.len() + 1);
    rows.push(TaxRow {
        month: 0,
        cap_gain_tax: Decimal::ZERO,
        interest_tax: Decimal::ZERO,
        recapture_tax,
    });

    let mut total_cap_gain_tax = Decimal::ZERO;
    let mut total_interest_tax = Decimal::ZERO;

    for row in schedule {
        let gain_recognized = row.principal.saturating_mul(gross_profit_ratio);
        let cap_gain_tax = gain_recognized.saturating_mul(gain_rate);
        let interest_tax = row.interest.saturating_mul(ordinary_rate);

        total_cap_gain_tax = total_cap_gain_tax.saturating_add(cap_gain_tax);
        total_interest_tax = total_interest_tax.saturating_add(interest_tax);

        rows.push(TaxRow {
            month: row.month,
            cap_gain_tax,
            interest_tax,
            recapture_tax: Decimal::ZERO,
        });
    }

    InstallmentTaxes {
        rows,
        gross_profit,
        gross_profit_ratio,
        total_cap_gain_tax,
        total_interest_tax,
        recapture_tax,
        total_tax: recapture_tax
            .saturating_add(total_cap_gain_tax)
            .saturating_add(total_interest_tax),
    }
}
