use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use seller_finance_core::amortization::build_schedule;
use seller_finance_core::time_value::discount_factor;

fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
    (a - b).abs() < tol
}

// ===========================================================================
// Reference note: 1.35M at 6% over 10 years
// ===========================================================================

#[test]
fn test_reference_note_annuity_identity() {
    let principal = dec!(1_350_000);
    let s = build_schedule(principal, dec!(6), dec!(10), Decimal::ZERO);

    assert_eq!(s.rows.len(), 120);
    assert_eq!(s.rows.last().unwrap().balance, Decimal::ZERO);

    // PV of 120 level payments at 0.5% must equal the principal:
    // P = PMT * (1 - v^n) / r
    let r = dec!(0.005);
    let v = discount_factor(r, 120);
    let pv = s.payment * (Decimal::ONE - v) / r;
    assert!(close(pv, principal, dec!(0.000001)), "pv {pv}");

    // Textbook payment 14,987.77
    assert!(close(s.payment, dec!(14987.77), dec!(0.01)), "payment {}", s.payment);
}

#[test]
fn test_reference_note_principal_sums_to_loan() {
    let s = build_schedule(dec!(1_350_000), dec!(6), dec!(10), Decimal::ZERO);
    assert!(close(s.total_principal(), dec!(1_350_000), dec!(0.000001)));
    assert!(close(
        s.total_paid(),
        s.total_principal() + s.total_interest(),
        dec!(0.000001)
    ));
}

#[test]
fn test_months_are_sequential() {
    let s = build_schedule(dec!(200_000), dec!(4.5), dec!(3), Decimal::ZERO);
    for (i, row) in s.rows.iter().enumerate() {
        assert_eq!(row.month as usize, i + 1);
    }
}

// ===========================================================================
// Properties across a grid of loans
// ===========================================================================

#[test]
fn test_fully_amortizing_loans_end_at_zero() {
    let principals = [dec!(0), dec!(1), dec!(75_000), dec!(3_250_000)];
    let rates = [dec!(0), dec!(0.5), dec!(6), dec!(12.75)];
    let terms = [dec!(1), dec!(7.5), dec!(30)];

    for &p in &principals {
        for &r in &rates {
            for &t in &terms {
                let s = build_schedule(p, r, t, Decimal::ZERO);
                let last = s.rows.last().expect("non-empty schedule");
                assert_eq!(last.balance, Decimal::ZERO, "p={p} r={r} t={t}");
                assert!(
                    close(s.total_principal(), p, dec!(0.000001)),
                    "p={p} r={r} t={t} sum={}",
                    s.total_principal()
                );
                assert!(s.rows.iter().all(|row| row.balance >= Decimal::ZERO));
            }
        }
    }
}

#[test]
fn test_balloon_payoff_pair_covers_principal() {
    let principal = dec!(900_000);
    for balloon in [dec!(1), dec!(250_000), dec!(899_999), dec!(900_000)] {
        for rate in [dec!(0), dec!(5.5)] {
            let s = build_schedule(principal, rate, dec!(7), balloon);
            let n = s.rows.len();
            let last_regular = &s.rows[n - 2];
            let payoff = &s.rows[n - 1];

            assert!(payoff.is_balloon);
            assert!(!last_regular.is_balloon);
            assert_eq!(payoff.month, last_regular.month);
            assert_eq!(payoff.interest, Decimal::ZERO);
            assert_eq!(payoff.balance, Decimal::ZERO);
            assert!(
                close(s.total_principal(), principal, dec!(0.000001)),
                "balloon={balloon} rate={rate}"
            );
        }
    }
}

#[test]
fn test_balloon_equal_to_principal_is_interest_only() {
    let s = build_schedule(dec!(500_000), dec!(6), dec!(5), dec!(500_000));
    // Every regular payment is pure interest: 500k * 0.5%
    assert!(close(s.payment, dec!(2500), dec!(0.000001)));
    let regular: Vec<_> = s.rows.iter().filter(|r| !r.is_balloon).collect();
    assert!(regular.iter().all(|r| close(r.principal, Decimal::ZERO, dec!(0.000001))));
}

// ===========================================================================
// Out-of-range inputs
// ===========================================================================

#[test]
fn test_extreme_principal_is_capped_not_panicking() {
    let huge = dec!(79_000_000_000_000_000_000_000_000_000);
    let s = build_schedule(huge, dec!(6), dec!(0.08), Decimal::ZERO);

    // 0.08 years rounds to one month; the note is capped at MAX_AMOUNT
    assert_eq!(s.rows.len(), 1);
    assert_eq!(s.total_principal(), seller_finance_core::MAX_AMOUNT);
    assert_eq!(s.rows[0].balance, Decimal::ZERO);
}

#[test]
fn test_extreme_rate_and_balloon_stay_defined() {
    let s = build_schedule(Decimal::MAX, Decimal::MAX, dec!(100), Decimal::MAX);
    assert_eq!(s.rows.len(), 1201);
    assert!(s.balloon_row().is_some());
    assert!(s.rows.iter().all(|r| r.balance >= Decimal::ZERO));
}
