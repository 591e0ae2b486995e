//! CSV export of the month-by-month schedule alongside its tax timeline.

use std::io::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::analysis::DerivedResult;
use crate::CalcResult;

pub const SCHEDULE_CSV_HEADER: [&str; 8] = [
    "Month",
    "Payment",
    "Interest",
    "Principal",
    "Balance",
    "CapGainTax",
    "InterestTax",
    "RecaptureTax",
];

/// Write one CSV row per amortization row, joined with the tax recognized
/// on that row. The month-0 recapture has no payment of its own, so it is
/// reported on the first row.
pub fn write_schedule_csv<W: Write>(result: &DerivedResult, writer: W) -> CalcResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SCHEDULE_CSV_HEADER)?;

    let schedule = &result.financing.schedule.rows;
    let tax_rows = &result.financing.taxes.rows;
    let upfront_recapture = tax_rows.first().map(|r| r.recapture_tax).unwrap_or_default();

    for (i, row) in schedule.iter().enumerate() {
        let tax = tax_rows.get(i + 1);
        let cap_gain_tax = tax.map(|t| t.cap_gain_tax).unwrap_or_default();
        let interest_tax = tax.map(|t| t.interest_tax).unwrap_or_default();
        let recapture_tax = if i == 0 {
            upfront_recapture
        } else {
            Decimal::ZERO
        };

        wtr.write_record([
            row.month.to_string(),
            money(row.payment),
            money(row.interest),
            money(row.principal),
            money(row.balance),
            money(cap_gain_tax),
            money(interest_tax),
            money(recapture_tax),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Schedule CSV as a string.
pub fn schedule_csv(result: &DerivedResult) -> CalcResult<String> {
    let mut buf = Vec::new();
    write_schedule_csv(result, &mut buf)?;
    String::from_utf8(buf).map_err(|e| crate::CalcError::SerializationError(e.to_string()))
}

fn money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
