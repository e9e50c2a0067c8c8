//! Commission and money arithmetic
//!
//! Every monetary value handled by the engine is a `Decimal` with exactly
//! two fractional digits. The commission is 1.5% of the principal, rounded
//! half away from zero to the cent.

use crate::types::{TransferError, TransferQuote};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of fractional digits of every stored amount
pub const MONEY_SCALE: u32 = 2;

/// Commission charged to the sender (0.015 = 1.5%)
pub const COMMISSION_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 3);

/// Round to the cent, half away from zero, and pad to two fractional digits
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Commission owed on a principal
pub fn commission_for(amount: Decimal) -> Result<Decimal, TransferError> {
    amount
        .checked_mul(COMMISSION_RATE)
        .map(round2)
        .ok_or_else(|| TransferError::system_failure("arithmetic overflow computing commission"))
}

/// Principal, commission and total debit of a transfer of `amount`
///
/// `amount` must already have gone through [`normalize_amount`].
pub fn breakdown(amount: Decimal) -> Result<TransferQuote, TransferError> {
    let commission_fee = commission_for(amount)?;
    let total_required = amount
        .checked_add(commission_fee)
        .ok_or_else(|| TransferError::system_failure("arithmetic overflow computing total debit"))?;

    Ok(TransferQuote {
        amount,
        commission_fee,
        total_required,
    })
}

/// Validate a transfer amount and bring it to the money scale
///
/// Rejects zero, negative values and values with sub-cent digits. Trailing
/// zeros beyond the second fractional digit are accepted.
pub fn normalize_amount(amount: Decimal) -> Result<Decimal, TransferError> {
    if amount <= Decimal::ZERO {
        return Err(TransferError::non_positive_amount());
    }
    normalize_money(amount)
}

/// Bring a non-negative amount to the money scale, rejecting sub-cent digits
pub fn normalize_money(value: Decimal) -> Result<Decimal, TransferError> {
    let mut value = value.normalize();
    if value.scale() > MONEY_SCALE {
        return Err(TransferError::invalid_argument(
            "Amounts cannot have more than 2 decimal places.",
        ));
    }
    value.rescale(MONEY_SCALE);
    Ok(value)
}

/// Parse a decimal amount from text
pub fn parse_amount(raw: &str) -> Result<Decimal, TransferError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| TransferError::invalid_argument(format!("Invalid amount '{}'", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn test_commission_rate_is_one_and_a_half_percent() {
        assert_eq!(COMMISSION_RATE, dec("0.015"));
    }

    #[rstest]
    #[case::hundred("100.00", "1.50")]
    #[case::two_hundred("200.00", "3.00")]
    #[case::half_cent_rounds_up("0.50", "0.01")]
    #[case::below_half_cent("0.33", "0.00")]
    #[case::one_cent("0.01", "0.00")]
    #[case::midpoint_away_from_zero("3.00", "0.05")]
    #[case::rounds_up_to_half("33.30", "0.50")]
    #[case::seventy_five("75.00", "1.13")]
    #[case::truncating_digits("10.10", "0.15")]
    fn test_commission_for(#[case] amount: &str, #[case] expected: &str) {
        let fee = commission_for(dec(amount)).unwrap();
        assert_eq!(fee, dec(expected));
        assert_eq!(fee.scale(), MONEY_SCALE);
    }

    #[test]
    fn test_breakdown_scenario_amounts() {
        let quote = breakdown(dec("100.00")).unwrap();
        assert_eq!(quote.commission_fee, dec("1.50"));
        assert_eq!(quote.total_required, dec("101.50"));

        let quote = breakdown(dec("200.00")).unwrap();
        assert_eq!(quote.total_required, dec("203.00"));
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-100.00")]
    fn test_normalize_amount_rejects_non_positive(#[case] amount: &str) {
        assert_eq!(
            normalize_amount(dec(amount)),
            Err(TransferError::non_positive_amount())
        );
    }

    #[rstest]
    #[case::integer("100", "100.00")]
    #[case::one_digit("0.5", "0.50")]
    #[case::trailing_zeros("100.000", "100.00")]
    fn test_normalize_amount_pads_scale(#[case] amount: &str, #[case] expected: &str) {
        let normalized = normalize_amount(dec(amount)).unwrap();
        assert_eq!(normalized, dec(expected));
        assert_eq!(normalized.to_string(), expected);
    }

    #[test]
    fn test_normalize_amount_rejects_sub_cent_digits() {
        let result = normalize_amount(dec("0.001"));
        assert!(matches!(result, Err(TransferError::InvalidArgument { .. })));
    }

    #[rstest]
    #[case::plain("100.00", Some("100.00"))]
    #[case::padded(" 42.5 ", Some("42.5"))]
    #[case::garbage("abc", None)]
    #[case::empty("", None)]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Option<&str>) {
        match expected {
            Some(value) => assert_eq!(parse_amount(raw).unwrap(), dec(value)),
            None => assert!(matches!(
                parse_amount(raw),
                Err(TransferError::InvalidArgument { .. })
            )),
        }
    }
}
