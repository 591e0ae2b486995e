use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{clamp_percent, CashFlow, Money, Percent};

/// Annual percent to monthly decimal: 12 months x 100.
const MONTHLY_PERCENT_DIVISOR: Decimal = dec!(1200);

/// Monthly periodic rate from an annual percentage (6 -> 0.005).
/// Negative rates floor to zero; rates cap at `MAX_PERCENT`.
pub fn monthly_rate(annual_pct: Percent) -> Decimal {
    clamp_percent(annual_pct) / MONTHLY_PERCENT_DIVISOR
}

/// Compound growth (1 + r)^n, or `None` when it leaves the Decimal range.
fn growth_factor(rate: Decimal, periods: u32) -> Option<Decimal> {
    if periods == 0 {
        return Some(Decimal::ONE);
    }
    Decimal::ONE
        .checked_add(rate)?
        .checked_powu(u64::from(periods))
        .filter(|g| !g.is_zero())
}

/// Discount factor (1 + r)^-n. A growth factor too large to represent
/// discounts to zero.
pub fn discount_factor(rate: Decimal, periods: u32) -> Decimal {
    growth_factor(rate, periods)
        .map(|g| Decimal::ONE / g)
        .unwrap_or(Decimal::ZERO)
}

/// Level periodic payment that amortizes `principal` down to `balloon`
/// after `periods` payments at periodic `rate`.
///
/// The balloon is discounted to present value first and the remainder is
/// run through the standard annuity formula:
///
/// PMT = (P - B(1+r)^-n) * r / (1 - (1+r)^-n)
///
/// With a zero rate this is straight-line: (P - B) / n. Zero periods give a
/// zero payment. A balloon above the principal yields a negative payment,
/// which is returned unchanged. A payment outside the Decimal range comes
/// back as zero.
pub fn level_payment(principal: Money, rate: Decimal, periods: u32, balloon: Money) -> Money {
    if periods == 0 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(periods);
    let straight_line = || {
        principal
            .checked_sub(balloon)
            .and_then(|net| net.checked_div(n))
    };

    let payment = if rate.is_zero() {
        straight_line()
    } else {
        let v = discount_factor(rate, periods);
        let annuity = Decimal::ONE - v;
        if annuity.is_zero() {
            straight_line()
        } else {
            balloon
                .checked_mul(v)
                .and_then(|pv_balloon| principal.checked_sub(pv_balloon))
                .and_then(|net| net.checked_mul(rate))
                .and_then(|scaled| scaled.checked_div(annuity))
        }
    };

    payment.unwrap_or(Decimal::ZERO)
}

/// Net present value of a monthly cash-flow stream.
///
/// NPV = sum(amount / (1 + r)^month) with r = annual_pct / 1200. Month 0
/// flows are undiscounted; a zero rate gives the plain sum. A total beyond
/// the Decimal range saturates.
pub fn npv_monthly(cash_flows: &[CashFlow], annual_discount_pct: Percent) -> Money {
    let rate = monthly_rate(annual_discount_pct);

    cash_flows
        .iter()
        .map(|cf| match growth_factor(rate, cf.month) {
            Some(g) => cf.amount / g,
            None => Decimal::ZERO,
        })
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
        assert_eq!(monthly_rate(dec!(-4)), Decimal::ZERO);
    }

    #[test]
    fn test_level_payment_standard_annuity() {
        // 100k over 30 years at 6%: textbook 599.55
        let pmt = level_payment(dec!(100000), dec!(0.005), 360, Decimal::ZERO);
        assert!((pmt - dec!(599.55)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_level_payment_zero_rate() {
        let pmt = level_payment(dec!(12000), Decimal::ZERO, 12, dec!(2400));
        assert_eq!(pmt, dec!(800));
    }

    #[test]
    fn test_level_payment_zero_periods() {
        assert_eq!(
            level_payment(dec!(1000), dec!(0.01), 0, Decimal::ZERO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_npv_monthly_basic() {
        let flows = vec![
            CashFlow::new(0, dec!(-1000)),
            CashFlow::new(12, dec!(1120)),
        ];
        // 12% annual -> 1% monthly; 1120 / 1.01^12 = 993.94
        let result = npv_monthly(&flows, dec!(12));
        assert!((result - dec!(-6.06)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_npv_monthly_zero_rate() {
        let flows = vec![
            CashFlow::new(0, dec!(-100)),
            CashFlow::new(1, dec!(50)),
            CashFlow::new(36, dec!(75)),
        ];
        assert_eq!(npv_monthly(&flows, Decimal::ZERO), dec!(25));
    }

    #[test]
    fn test_npv_month_zero_undiscounted() {
        let flows = vec![CashFlow::new(0, dec!(5000))];
        assert_eq!(npv_monthly(&flows, dec!(25)), dec!(5000));
    }

    #[test]
    fn test_discount_factor_overflow_is_zero() {
        assert_eq!(discount_factor(dec!(100), 1200), Decimal::ZERO);
        assert_eq!(discount_factor(Decimal::MAX, 1), Decimal::ZERO);
    }

    #[test]
    fn test_level_payment_out_of_range_is_zero() {
        let huge = dec!(79_000_000_000_000_000_000_000_000_000);
        // one period at 0.5%: P * r / (1 - v) is just above P, past Decimal::MAX
        assert_eq!(level_payment(huge, dec!(0.005), 1, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(level_payment(huge, Decimal::ZERO, 1, -huge), Decimal::ZERO);
    }

    #[test]
    fn test_npv_monthly_saturates() {
        let flows = vec![
            CashFlow::new(0, Decimal::MAX),
            CashFlow::new(0, Decimal::MAX),
        ];
        assert_eq!(npv_monthly(&flows, Decimal::MAX), Decimal::MAX);
    }
}
