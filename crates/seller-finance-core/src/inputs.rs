use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tax::all_cash::AllCashTaxInput;
use crate::tax::installment::InstallmentTaxInput;
use crate::types::{clamp_money, clamp_percent, floor_zero, Money, Month, Percent, Years};

pub use crate::types::{MAX_AMOUNT, MAX_PERCENT};

/// Ceiling for fields that are a share of a whole (down payment, holdback).
pub const MAX_SHARE_PERCENT: Percent = dec!(100);
/// Longest horizon in years accepted by `sanitized`.
pub const MAX_YEARS: Years = dec!(100);
/// Longest holdback release horizon in months.
pub const MAX_HOLDBACK_MONTHS: Month = 1200;

/// Every input to the seller-financing comparison, as the form holds it.
///
/// Money is in currency units, rates are percentages on a 0-100 scale.
/// Missing fields deserialize to the sample deal in `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealInputs {
    // --- Sale ---
    pub price: Money,
    pub selling_costs: Money,
    /// Seller's adjusted cost basis
    pub basis: Money,
    /// Accumulated depreciation subject to recapture
    pub recapture_amount: Money,
    pub recapture_rate: Percent,

    // --- Tax rates ---
    pub federal_ltcg_rate: Percent,
    pub state_ltcg_rate: Percent,
    pub federal_ordinary_rate: Percent,
    pub state_ordinary_rate: Percent,

    // --- All-cash path ---
    /// Share of net proceeds withheld at closing
    pub holdback_pct: Percent,
    /// Month the holdback is released to the seller
    pub holdback_release_months: Month,
    /// Annual yield earned on proceeds received at closing
    pub reinvest_rate: Percent,
    pub reinvest_years: Years,

    // --- Seller financing ---
    pub down_payment_pct: Percent,
    /// Annual note rate
    pub interest_rate: Percent,
    pub term_years: Years,
    /// Lump sum due at maturity (zero for a fully amortizing note)
    pub balloon: Money,

    // --- Comparison ---
    /// Annual discount rate for both NPV legs
    pub discount_rate: Percent,
}

impl Default for DealInputs {
    fn default() -> Self {
        Self {
            price: dec!(1_500_000),
            selling_costs: dec!(90_000),
            basis: dec!(700_000),
            recapture_amount: dec!(150_000),
            recapture_rate: dec!(25),
            federal_ltcg_rate: dec!(20),
            state_ltcg_rate: dec!(5),
            federal_ordinary_rate: dec!(37),
            state_ordinary_rate: dec!(5),
            holdback_pct: dec!(10),
            holdback_release_months: 12,
            reinvest_rate: dec!(4.5),
            reinvest_years: dec!(10),
            down_payment_pct: dec!(10),
            interest_rate: dec!(6),
            term_years: dec!(10),
            balloon: Decimal::ZERO,
            discount_rate: dec!(5),
        }
    }
}

/// Field names of the flat key-value form, in display order.
pub const FIELD_NAMES: [&str; 18] = [
    "price",
    "selling_costs",
    "basis",
    "recapture_amount",
    "recapture_rate",
    "federal_ltcg_rate",
    "state_ltcg_rate",
    "federal_ordinary_rate",
    "state_ordinary_rate",
    "holdback_pct",
    "holdback_release_months",
    "reinvest_rate",
    "reinvest_years",
    "down_payment_pct",
    "interest_rate",
    "term_years",
    "balloon",
    "discount_rate",
];

impl DealInputs {
    /// Copy with every field forced into the engine's safe domain:
    /// negatives floor to zero and oversized values are capped.
    pub fn sanitized(&self) -> Self {
        let money = clamp_money;
        let pct = clamp_percent;
        let share = |v: Percent| floor_zero(v).min(MAX_SHARE_PERCENT);
        let years = |v: Years| floor_zero(v).min(MAX_YEARS);

        Self {
            price: money(self.price),
            selling_costs: money(self.selling_costs),
            basis: money(self.basis),
            recapture_amount: money(self.recapture_amount),
            recapture_rate: pct(self.recapture_rate),
            federal_ltcg_rate: pct(self.federal_ltcg_rate),
            state_ltcg_rate: pct(self.state_ltcg_rate),
            federal_ordinary_rate: pct(self.federal_ordinary_rate),
            state_ordinary_rate: pct(self.state_ordinary_rate),
            holdback_pct: share(self.holdback_pct),
            holdback_release_months: self.holdback_release_months.min(MAX_HOLDBACK_MONTHS),
            reinvest_rate: pct(self.reinvest_rate),
            reinvest_years: years(self.reinvest_years),
            down_payment_pct: share(self.down_payment_pct),
            interest_rate: pct(self.interest_rate),
            term_years: years(self.term_years),
            balloon: money(self.balloon),
            discount_rate: pct(self.discount_rate),
        }
    }

    /// Decode a flat key-value object without ever failing.
    ///
    /// Each field is read from a JSON number or a numeric string. Anything
    /// missing or unparseable keeps the value from `fallback`; input that is
    /// not an object yields `fallback` unchanged.
    pub fn from_value_lenient(value: &Value, fallback: &DealInputs) -> DealInputs {
        let mut inputs = fallback.clone();
        let Some(map) = value.as_object() else {
            tracing::warn!("deal inputs are not a key-value object; keeping previous values");
            return inputs;
        };

        for name in FIELD_NAMES {
            let Some(raw) = map.get(name) else {
                continue;
            };
            let Some(parsed) = lenient_decimal(raw) else {
                tracing::warn!(field = name, "unparseable deal input; keeping previous value");
                continue;
            };
            inputs.set_field(name, parsed);
        }

        inputs
    }

    fn set_field(&mut self, name: &str, value: Decimal) {
        let slot = match name {
            "price" => &mut self.price,
            "selling_costs" => &mut self.selling_costs,
            "basis" => &mut self.basis,
            "recapture_amount" => &mut self.recapture_amount,
            "recapture_rate" => &mut self.recapture_rate,
            "federal_ltcg_rate" => &mut self.federal_ltcg_rate,
            "state_ltcg_rate" => &mut self.state_ltcg_rate,
            "federal_ordinary_rate" => &mut self.federal_ordinary_rate,
            "state_ordinary_rate" => &mut self.state_ordinary_rate,
            "holdback_pct" => &mut self.holdback_pct,
            "reinvest_rate" => &mut self.reinvest_rate,
            "reinvest_years" => &mut self.reinvest_years,
            "down_payment_pct" => &mut self.down_payment_pct,
            "interest_rate" => &mut self.interest_rate,
            "term_years" => &mut self.term_years,
            "balloon" => &mut self.balloon,
            "discount_rate" => &mut self.discount_rate,
            "holdback_release_months" => {
                self.holdback_release_months = whole_months(value);
                return;
            }
            _ => return,
        };
        *slot = value;
    }

    pub fn down_payment(&self) -> Money {
        self.price * self.down_payment_pct / dec!(100)
    }

    /// Principal carried by the seller's note.
    pub fn loan_principal(&self) -> Money {
        self.price - self.down_payment()
    }

    pub fn all_cash_tax_input(&self) -> AllCashTaxInput {
        AllCashTaxInput {
            price: self.price,
            selling_costs: self.selling_costs,
            basis: self.basis,
            recapture_amount: self.recapture_amount,
            recapture_rate: self.recapture_rate,
            ltcg_rate: self.federal_ltcg_rate,
            state_gain_rate: self.state_ltcg_rate,
        }
    }

    pub fn installment_tax_input(&self) -> InstallmentTaxInput {
        InstallmentTaxInput {
            price: self.price,
            selling_costs: self.selling_costs,
            basis: self.basis,
            recapture_amount: self.recapture_amount,
            recapture_rate: self.recapture_rate,
            ltcg_rate: self.federal_ltcg_rate,
            state_gain_rate: self.state_ltcg_rate,
            ordinary_rate: self.federal_ordinary_rate,
            state_ordinary_rate: self.state_ordinary_rate,
        }
    }
}

fn lenient_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

/// Nearest whole month, saturating at `u32::MAX`. Capping to the engine's
/// horizon is left to `sanitized` so decoding stays lossless.
fn whole_months(value: Decimal) -> Month {
    floor_zero(value.round())
        .min(Decimal::from(Month::MAX))
        .to_u32()
        .unwrap_or(Month::MAX)
}
