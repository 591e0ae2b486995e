use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{level_payment, monthly_rate};
use crate::types::{clamp_money, floor_zero, years_to_months, Money, Month, Percent, Years};

/// Upper bound on schedule length (100 years of monthly payments).
pub const MAX_TERM_MONTHS: Month = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One line of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based payment month
    pub month: Month,
    /// Total paid this period (interest + principal)
    pub payment: Money,
    /// Interest accrued on the opening balance
    pub interest: Money,
    /// Principal retired this period
    pub principal: Money,
    /// Closing balance after the payment, never negative
    pub balance: Money,
    /// Synthetic lump-sum payoff row appended at maturity
    pub is_balloon: bool,
}

/// A complete amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub rows: Vec<AmortizationRow>,
    /// Level monthly payment (before the balloon, if any)
    pub payment: Money,
}

impl Schedule {
    /// Number of regular monthly payments (balloon row excluded).
    pub fn term_months(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_balloon).count()
    }

    pub fn total_paid(&self) -> Money {
        self.rows.iter().map(|r| r.payment).sum()
    }

    pub fn total_interest(&self) -> Money {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.rows.iter().map(|r| r.principal).sum()
    }

    pub fn balloon_row(&self) -> Option<&AmortizationRow> {
        self.rows.iter().find(|r| r.is_balloon)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a fixed-payment schedule for a seller-carried note, with an
/// optional balloon at maturity.
///
/// The level payment amortizes the principal net of the balloon's present
/// value, so the balance lands on `balloon` after the last regular payment.
/// Any floating residue is folded into the final period: without a balloon
/// the last row retires whatever is left, with a balloon it retires down to
/// the balloon and a synthetic payoff row follows at the same month.
///
/// Negative inputs floor to zero and amounts cap at `MAX_AMOUNT`. A term
/// that rounds to zero months gives an empty schedule with a zero payment.
pub fn build_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    term_years: Years,
    balloon: Money,
) -> Schedule {
    let principal = clamp_money(principal);
    let balloon = clamp_money(balloon);
    let n = years_to_months(term_years, MAX_TERM_MONTHS);
    let r = monthly_rate(annual_rate_pct);

    let payment = level_payment(principal, r, n, balloon);
    let has_balloon = balloon > Decimal::ZERO;

    let mut rows = Vec::with_capacity(n as usize + usize::from(has_balloon));
    let mut balance = principal;

    for month in 1..=n {
        let interest = balance * r;
        let mut principal_part = payment - interest;
        let mut paid = payment;

        if month == n {
            principal_part = if has_balloon {
                floor_zero(balance - balloon)
            } else {
                balance
            };
            paid = interest + principal_part;
        }

        balance -= principal_part;

        rows.push(AmortizationRow {
            month,
            payment: paid,
            interest,
            principal: principal_part,
            balance: floor_zero(balance),
            is_balloon: false,
        });

        if month == n && has_balloon {
            rows.push(AmortizationRow {
                month,
                payment: balloon,
                interest: Decimal::ZERO,
                principal: balloon,
                balance: Decimal::ZERO,
                is_balloon: true,
            });
            break;
        }
    }

    Schedule { rows, payment }
}
