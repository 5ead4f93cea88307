//! Helpers for showing amounts and dates to the user.

use numfmt::{Formatter, Precision};
use time::{Month, OffsetDateTime};

/// Format `amount` as currency with two decimal places and thousands separators,
/// e.g. `format_currency(1234.5, "₹")` gives "₹1,234.50".
///
/// Amounts are rounded to the nearest cent, and anything that rounds to zero
/// is shown as zero. Negative amounts put the minus sign before the symbol:
/// "-₹12.30". Amounts of a trillion or more are shown without separators.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    if amount.is_nan() {
        return format!("{symbol}NaN");
    }

    let sign = if amount < 0.0 { "-" } else { "" };

    if amount.is_infinite() {
        return format!("{sign}{symbol}∞");
    }

    let cents = (amount.abs() * 100.0).round();
    if cents == 0.0 {
        return format!("{symbol}0.00");
    }

    let units = (cents / 100.0).trunc();
    let remainder = (cents - units * 100.0).clamp(0.0, 99.0) as u8;

    format!(
        "{}.{remainder:02}",
        format_units(units, &format!("{sign}{symbol}"))
    )
}

/// numfmt switches to scientific notation for very large numbers.
const MAX_GROUPED_UNITS: f64 = 1e12;

/// Format a whole number of currency units with thousands separators.
fn format_units(units: f64, prefix: &str) -> String {
    if units < 1.0 {
        // numfmt renders zero as "0" without the prefix.
        return format!("{prefix}0");
    }

    if units >= MAX_GROUPED_UNITS {
        return format!("{prefix}{units:.0}");
    }

    match Formatter::currency(prefix) {
        Ok(formatter) => {
            let formatted = formatter
                .precision(Precision::Decimals(0))
                .fmt_string(units);

            match formatted.split_once('.') {
                Some((whole, _)) => whole.to_owned(),
                None => formatted,
            }
        }
        Err(error) => {
            tracing::warn!("Could not use {prefix:?} as a currency prefix: {error}");
            format!("{prefix}{units:.0}")
        }
    }
}

/// Format the calendar date of `date` as "07 Aug 2024".
pub fn format_date_label(date: OffsetDateTime) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        month_abbrev(date.month()),
        date.year()
    )
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
