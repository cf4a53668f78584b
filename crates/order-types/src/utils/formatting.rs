//! String formatting utilities.
//!
//! Provides decimal-place counting for precision checks, amount rendering for
//! quote descriptions and address truncation for log output.

use rust_decimal::Decimal;

/// Utility function to truncate an address for display purposes.
///
/// Shows only the first 12 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(12) {
		Some((idx, _)) => format!("{}..", &id[..idx]),
		None => id.to_string(),
	}
}

/// Number of significant decimal places of a value.
///
/// Trailing zeros do not count, so `1.50` has one decimal place.
pub fn decimal_places(value: Decimal) -> u32 {
	value.normalize().scale()
}

/// Renders an amount rounded to at most `max_decimals` places, without trailing zeros.
pub fn display_amount(value: Decimal, max_decimals: u32) -> String {
	value.round_dp(max_decimals).normalize().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn dec(s: &str) -> Decimal {
		Decimal::from_str(s).unwrap()
	}

	#[test]
	fn test_decimal_places_ignores_trailing_zeros() {
		assert_eq!(decimal_places(dec("100")), 0);
		assert_eq!(decimal_places(dec("1.50")), 1);
		assert_eq!(decimal_places(dec("0.00000001")), 8);
		assert_eq!(decimal_places(dec("-2.125")), 3);
	}

	#[test]
	fn test_display_amount_rounds_and_trims() {
		assert_eq!(display_amount(dec("1.123456789"), 8), "1.12345679");
		assert_eq!(display_amount(dec("20.000"), 8), "20");
		assert_eq!(display_amount(dec("0.5"), 8), "0.5");
	}

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("short"), "short");
		assert_eq!(truncate_id("component_tdx_2_1abcdef"), "component_td..");
	}
}
