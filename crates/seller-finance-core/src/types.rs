use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Largest monetary amount the engine works with (one trillion).
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000);
/// Largest rate, in percent, the engine works with.
pub const MAX_PERCENT: Percent = dec!(1000);

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as percentages on a 0-100 scale (6.5 = 6.5%).
pub type Percent = Decimal;

/// Year counts, fractional allowed (7.5 = seven and a half years)
pub type Years = Decimal;

/// Month index within a schedule or cash-flow stream. Month 0 is closing.
pub type Month = u32;

/// A single signed cash flow to the seller: positive is an inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlow {
    pub month: Month,
    pub amount: Money,
}

impl CashFlow {
    pub fn new(month: Month, amount: Money) -> Self {
        Self { month, amount }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Clamp negatives to zero. Every engine entry point runs its inputs through
/// this so that bad values degrade to a defined result instead of an error.
pub(crate) fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Floor at zero and cap at [`MAX_AMOUNT`].
pub(crate) fn clamp_money(value: Money) -> Money {
    floor_zero(value).min(MAX_AMOUNT)
}

/// Floor at zero and cap at [`MAX_PERCENT`].
pub(crate) fn clamp_percent(value: Percent) -> Percent {
    floor_zero(value).min(MAX_PERCENT)
}

/// Convert a span in years to a whole month count, rounding half up
/// (2.5 months becomes 3, not 2). Negative spans give zero months.
pub(crate) fn years_to_months(years: Decimal, cap: Month) -> Month {
    let months = (floor_zero(years) * Decimal::from(12))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if months >= Decimal::from(cap) {
        return cap;
    }
    months.to_u32().unwrap_or(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_years_to_months_rounds_half_up() {
        assert_eq!(years_to_months(dec!(10), 1200), 120);
        // 0.125 years = 1.5 months
        assert_eq!(years_to_months(dec!(0.125), 1200), 2);
        // 0.04 years = 0.48 months
        assert_eq!(years_to_months(dec!(0.04), 1200), 0);
    }

    #[test]
    fn test_clamp_helpers() {
        assert_eq!(clamp_money(dec!(-5)), Decimal::ZERO);
        assert_eq!(clamp_money(Decimal::MAX), MAX_AMOUNT);
        assert_eq!(clamp_percent(dec!(6.5)), dec!(6.5));
        assert_eq!(clamp_percent(Decimal::MAX), MAX_PERCENT);
    }

    #[test]
    fn test_years_to_months_clamps() {
        assert_eq!(years_to_months(dec!(-3), 1200), 0);
        assert_eq!(years_to_months(dec!(500), 1200), 1200);
    }
}
