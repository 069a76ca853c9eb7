/*
 * Utility functions and helpers
 */

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parses user input as a non-negative decimal amount.
#[must_use]
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let amount = Decimal::from_str(trimmed).ok()?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }
    Some(amount)
}

fn scale(decimals: u32) -> Option<Decimal> {
    10u64.checked_pow(decimals).map(Decimal::from)
}

/// Converts a human amount into base units, `floor(amount * 10^decimals)`.
///
/// Empty, negative, non-numeric or overflowing input yields `None`.
#[must_use]
pub fn to_base_units(input: &str, decimals: u32) -> Option<u64> {
    let amount = parse_amount(input)?;
    amount.checked_mul(scale(decimals)?)?.floor().to_u64()
}

/// Converts base units back into a human amount.
#[must_use]
pub fn from_base_units(units: u64, decimals: u32) -> Option<Decimal> {
    Decimal::from(units).checked_div(scale(decimals)?)
}

/// Estimated output shown next to the swap form: `amount * price` to 4 places.
#[must_use]
pub fn estimated_output(amount: &str, price: Option<Decimal>) -> String {
    let (Some(amount), Some(price)) = (parse_amount(amount), price) else {
        return String::new();
    };
    if price.is_zero() {
        return String::new();
    }
    match amount.checked_mul(price) {
        Some(out) => format!("{:.4}", out.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)),
        None => String::new(),
    }
}

#[must_use]
pub fn short_address(address: &str) -> String {
    address.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_units_floor_the_scaled_amount() {
        assert_eq!(to_base_units("1.5", 6), Some(1_500_000));
        assert_eq!(to_base_units("0.0000019", 6), Some(1));
        assert_eq!(to_base_units("2", 9), Some(2_000_000_000));
        assert_eq!(to_base_units("0", 9), Some(0));
    }

    #[test]
    fn base_units_reject_bad_input() {
        assert_eq!(to_base_units("", 6), None);
        assert_eq!(to_base_units("   ", 6), None);
        assert_eq!(to_base_units("-1", 6), None);
        assert_eq!(to_base_units("abc", 6), None);
        assert_eq!(to_base_units("1.2.3", 6), None);
        assert_eq!(to_base_units("99999999999999999999", 9), None);
    }

    #[test]
    fn base_units_convert_back() {
        assert_eq!(from_base_units(1_500_000, 6), Some(Decimal::new(15, 1)));
    }

    #[test]
    fn estimated_output_uses_four_places() {
        let price = Decimal::from_str("20.5").unwrap();
        assert_eq!(estimated_output("0.5", Some(price)), "10.2500");
        assert_eq!(estimated_output("1", Some(Decimal::from_str("0.123456").unwrap())), "0.1235");
    }

    #[test]
    fn estimated_output_rounds_half_up() {
        assert_eq!(estimated_output("0.00005", Some(Decimal::ONE)), "0.0001");
        assert_eq!(estimated_output("0.12345", Some(Decimal::ONE)), "0.1235");
    }

    #[test]
    fn estimated_output_is_blank_without_inputs() {
        assert_eq!(estimated_output("", Some(Decimal::ONE)), "");
        assert_eq!(estimated_output("1", None), "");
        assert_eq!(estimated_output("x", Some(Decimal::ONE)), "");
    }
}
