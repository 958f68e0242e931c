//! Decimal helpers shared by the report and payout code.

use rust_decimal::prelude::*;

/// Amounts are presented and submitted with two decimal places.
pub const DECIMAL_PLACES: u32 = 2;

/// Round to two decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse operator input as an amount. Blank or unparseable text counts as zero.
pub fn parse_amount(input: &str) -> Decimal {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Format an amount with two decimal places and thousands separators
pub fn format_amount(value: Decimal) -> String {
    let rounded = format!("{:.2}", round2(value));
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_midpoint_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(60)), dec!(60.00));
    }

    #[test]
    fn blank_and_garbage_parse_as_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(" 40.5 "), dec!(40.5));
        assert_eq!(parse_amount("-12"), dec!(-12));
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(999.5)), "999.50");
        assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_amount(dec!(-1000)), "-1,000.00");
    }
}
