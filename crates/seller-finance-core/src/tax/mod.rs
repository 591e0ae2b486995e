//! Simplified sale-tax models: flat federal and state rates, no brackets.
//!
//! Both paths share the same recapture treatment. Depreciation recapture is
//! capped at the realized gain and always recognized at closing. Amounts
//! are clamped to `[0, MAX_AMOUNT]` and rates to `[0, MAX_PERCENT]`.

pub mod all_cash;
pub mod installment;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{clamp_money, clamp_percent, Money, Percent};

/// Federal + state percentages as a decimal multiplier (20 + 5 -> 0.25).
pub(crate) fn combined_rate(federal: Percent, state: Percent) -> Decimal {
    (clamp_percent(federal) + clamp_percent(state)) / dec!(100)
}

/// Sale price net of selling costs.
pub(crate) fn amount_realized(price: Money, selling_costs: Money) -> Money {
    clamp_money(price) - clamp_money(selling_costs)
}

/// Portion of the gain taxed as recapture, and the tax on it.
pub(crate) fn recapture(gain: Money, recapture_amount: Money, rate: Percent) -> (Money, Money) {
    let taxable = clamp_money(recapture_amount).min(clamp_money(gain));
    (taxable, taxable * clamp_percent(rate) / dec!(100))
}
