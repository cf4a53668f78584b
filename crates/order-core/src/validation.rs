//! Validation engine for order input.
//!
//! Every check here is a pure function of its inputs. Per-leg results are
//! cached on the legs by the mutation handlers; price, slippage and the
//! aggregate result are computed on every read.

use crate::state::OrderInputState;
use order_types::{
	decimal_places, OrderSide, OrderTab, TokenLeg, TradingContext, ValidationResult,
};
use rust_decimal::Decimal;

/// Slippage at or above this fraction produces a warning.
pub const HIGH_SLIPPAGE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Allowed deviation of a limit price from the opposite best price before warning.
pub const PRICE_DEVIATION: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Validates an amount against the exchange precision.
///
/// An unset amount is valid; an amount at or below zero is rejected before the
/// precision check.
pub fn validate_amount(amount: Option<Decimal>, max_decimals: u32) -> ValidationResult {
	match amount {
		None => ValidationResult::ok(),
		Some(amount) if amount <= Decimal::ZERO => {
			ValidationResult::invalid("Amount must be greater than 0")
		},
		Some(amount) if decimal_places(amount) > max_decimals => {
			ValidationResult::invalid("Too many decimal places")
		},
		Some(_) => ValidationResult::ok(),
	}
}

/// Checks the leg1 amount against the known balance. An unknown balance counts as zero.
pub fn check_funds(leg: &TokenLeg) -> ValidationResult {
	let balance = leg.balance.unwrap_or(Decimal::ZERO);
	let amount = leg.amount.unwrap_or(Decimal::ZERO);
	if balance < amount {
		ValidationResult::invalid("Insufficient funds")
	} else {
		ValidationResult::ok()
	}
}

/// Validates leg1: the funds check takes precedence over the amount checks.
pub fn validate_leg1(leg: &TokenLeg, max_decimals: u32) -> ValidationResult {
	let funds = check_funds(leg);
	if !funds.valid {
		return funds;
	}
	validate_amount(leg.amount, max_decimals)
}

/// Validates a limit price for the given side against the pair precision and the book.
pub fn validate_price(price: Decimal, side: OrderSide, context: &TradingContext) -> ValidationResult {
	if price <= Decimal::ZERO {
		return ValidationResult::invalid("Price must be greater than 0");
	}
	if decimal_places(price) > context.pair.price_max_decimals {
		return ValidationResult::invalid("Too many decimal places");
	}

	// A zero best price means the book side is empty
	let best_sell = context.best_sell.filter(|p| !p.is_zero());
	let best_buy = context.best_buy.filter(|p| !p.is_zero());
	match side {
		OrderSide::Buy => {
			if let Some(ceiling) = best_sell.and_then(|p| p.checked_mul(Decimal::ONE + PRICE_DEVIATION)) {
				if price > ceiling {
					return ValidationResult::warning("Price is significantly higher than best sell");
				}
			}
		},
		OrderSide::Sell => {
			if let Some(floor) = best_buy.and_then(|p| p.checked_mul(Decimal::ONE - PRICE_DEVIATION)) {
				if price < floor {
					return ValidationResult::warning("Price is significantly lower than best buy");
				}
			}
		},
	}
	ValidationResult::ok()
}

/// Validates a slippage fraction.
pub fn validate_slippage(slippage: Decimal) -> ValidationResult {
	if slippage < Decimal::ZERO {
		ValidationResult::invalid("Slippage must be positive")
	} else if slippage >= HIGH_SLIPPAGE {
		ValidationResult::warning("High slippage entered")
	} else {
		ValidationResult::ok()
	}
}

/// Combines the cached leg results with the tab-specific check.
///
/// Precedence: leg1, then leg2, then price on the limit tab or slippage on the
/// market tab. Warnings never make the order invalid.
pub fn validate_order(state: &OrderInputState, context: &TradingContext) -> ValidationResult {
	for leg in [&state.leg1, &state.leg2] {
		if !leg.valid || leg.amount.is_none() {
			return ValidationResult::invalid(leg.message.clone());
		}
	}

	match state.tab {
		OrderTab::Limit => {
			let price = validate_price(state.price, state.side, context);
			if !price.valid {
				return price;
			}
		},
		OrderTab::Market => {
			let slippage = validate_slippage(state.slippage);
			if !slippage.valid {
				return slippage;
			}
		},
	}
	ValidationResult::ok()
}
