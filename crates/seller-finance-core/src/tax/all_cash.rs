use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{amount_realized, combined_rate, recapture};
use crate::types::{clamp_money, floor_zero, Money, Percent};

/// Inputs for taxing an outright (all-cash) sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllCashTaxInput {
    pub price: Money,
    pub selling_costs: Money,
    /// Seller's adjusted cost basis
    pub basis: Money,
    /// Accumulated depreciation subject to recapture
    pub recapture_amount: Money,
    pub recapture_rate: Percent,
    /// Federal long-term capital gains rate
    pub ltcg_rate: Percent,
    /// State rate applied to capital gains
    pub state_gain_rate: Percent,
}

/// Tax owed at closing on an all-cash sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllCashTaxes {
    pub amount_realized: Money,
    /// Realized gain, floored at zero
    pub gain: Money,
    pub recapture_tax: Money,
    pub cap_gain_tax: Money,
    pub total_tax: Money,
}

/// Tax on an all-cash sale, recognized in full at month 0.
///
/// Gain is floored at zero so a loss never produces a negative tax. The
/// recapture slice (capped at the gain) is taxed at the recapture rate and
/// the remaining gain at the combined federal + state capital gains rate.
pub fn taxes_all_cash(input: &AllCashTaxInput) -> AllCashTaxes {
    let amount_realized = amount_realized(input.price, input.selling_costs);
    let gain = floor_zero(amount_realized - clamp_money(input.basis));

    let (recapture_taxable, recapture_tax) =
        recapture(gain, input.recapture_amount, input.recapture_rate);

    let cap_gain_tax = (gain - recapture_taxable)
        * combined_rate(input.ltcg_rate, input.state_gain_rate);

    AllCashTaxes {
        amount_realized,
        gain,
        recapture_tax,
        cap_gain_tax,
        total_tax: recapture_tax + cap_gain_tax,
    }
}

impl AllCashTaxes {
    /// Cash left after closing costs and taxes.
    pub fn net_proceeds(&self) -> Money {
        self.amount_realized - self.total_tax
    }

    /// Tax as a share of the realized gain (zero when there is no gain).
    pub fn effective_rate(&self) -> Decimal {
        if self.gain.is_zero() {
            Decimal::ZERO
        } else {
            self.total_tax / self.gain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample_input() -> AllCashTaxInput {
        AllCashTaxInput {
            price: dec!(1_500_000),
            selling_costs: Decimal::ZERO,
            basis: dec!(700_000),
            recapture_amount: Decimal::ZERO,
            recapture_rate: dec!(37),
            ltcg_rate: dec!(20),
            state_gain_rate: dec!(5),
        }
    }

    #[test]
    fn test_reference_sale() {
        let t = taxes_all_cash(&sample_input());
        assert_eq!(
            t,
            AllCashTaxes {
                amount_realized: dec!(1_500_000),
                gain: dec!(800_000),
                recapture_tax: Decimal::ZERO,
                cap_gain_tax: dec!(200_000),
                total_tax: dec!(200_000),
            }
        );
    }

    #[test]
    fn test_recapture_split() {
        let mut input = sample_input();
        input.selling_costs = dec!(90_000);
        input.recapture_amount = dec!(150_000);
        input.recapture_rate = dec!(25);
        let t = taxes_all_cash(&input);

        // realized 1.41M, gain 710k, recapture 150k @ 25%, rest 560k @ 25%
        assert_eq!(t.amount_realized, dec!(1_410_000));
        assert_eq!(t.gain, dec!(710_000));
        assert_eq!(t.recapture_tax, dec!(37_500));
        assert_eq!(t.cap_gain_tax, dec!(140_000));
        assert_eq!(t.total_tax, dec!(177_500));
        assert_eq!(t.net_proceeds(), dec!(1_232_500));
    }

    #[test]
    fn test_loss_produces_no_tax() {
        let mut input = sample_input();
        input.basis = dec!(2_000_000);
        input.recapture_amount = dec!(100_000);
        let t = taxes_all_cash(&input);
        assert_eq!(t.gain, Decimal::ZERO);
        assert_eq!(t.total_tax, Decimal::ZERO);
        assert_eq!(t.effective_rate(), Decimal::ZERO);
    }

    #[test]
    fn test_recapture_cannot_exceed_gain() {
        let mut input = sample_input();
        input.basis = dec!(1_450_000);
        input.recapture_amount = dec!(200_000);
        let t = taxes_all_cash(&input);
        // only 50k of gain exists; all of it is recapture
        assert_eq!(t.recapture_tax, dec!(18_500));
        assert_eq!(t.cap_gain_tax, Decimal::ZERO);
    }
}
