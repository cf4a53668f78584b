//! Quote types for the pricing engine contract.
//!
//! A quote request carries exactly one price constraint: the limit price on the
//! limit tab or the slippage tolerance on the market tab.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderSide, OrderType, TokenInfo};

/// Default message prefix used by the pricing engine to signal a liquidity shortfall.
pub const DEFAULT_LIQUIDITY_MESSAGE_PREFIX: &str = "Not enough liquidity";

/// The single price constraint attached to a quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceConstraint {
	/// Limit price, used for limit and post-only orders.
	Price(Decimal),
	/// Maximum slippage fraction, used for market orders.
	Slippage(Decimal),
}

/// Request for a priced preview of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	/// Pair component address.
	pub pair_address: String,
	/// Wire order type.
	pub order_type: OrderType,
	/// Order direction.
	pub side: OrderSide,
	/// Address of the target leg token.
	pub token_address: String,
	/// Amount entered on the target leg.
	pub amount: Decimal,
	/// Platform fee fraction charged on the order.
	pub platform_fee: Decimal,
	/// Limit price or slippage, depending on the order tab.
	#[serde(flatten)]
	pub constraint: PriceConstraint,
}

/// Priced preview returned by the pricing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
	/// Amount sent by the account.
	pub from_amount: Decimal,
	/// Amount received by the account.
	pub to_amount: Decimal,
	/// Token sent.
	pub from_token: TokenInfo,
	/// Token received.
	pub to_token: TokenInfo,
	/// Free-form message from the engine.
	#[serde(default)]
	pub message: String,
	/// Structured liquidity shortfall signal, when the engine provides one.
	#[serde(default)]
	pub insufficient_liquidity: bool,
}

impl Quote {
	/// Returns true when the quote reports a liquidity shortfall.
	///
	/// The structured flag wins; engines that only report through the message
	/// are recognised by the given prefix.
	pub fn signals_insufficient_liquidity(&self, message_prefix: &str) -> bool {
		self.insufficient_liquidity
			|| (!message_prefix.is_empty() && self.message.starts_with(message_prefix))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn sample_quote(message: &str, flag: bool) -> Quote {
		Quote {
			from_amount: Decimal::ONE,
			to_amount: Decimal::TWO,
			from_token: TokenInfo::default(),
			to_token: TokenInfo::default(),
			message: message.to_string(),
			insufficient_liquidity: flag,
		}
	}

	#[test]
	fn test_liquidity_signal_by_prefix_and_flag() {
		let prefix = DEFAULT_LIQUIDITY_MESSAGE_PREFIX;
		assert!(sample_quote("Not enough liquidity. Only 5 available", false)
			.signals_insufficient_liquidity(prefix));
		assert!(sample_quote("", true).signals_insufficient_liquidity(prefix));
		assert!(!sample_quote("Quote ok", false).signals_insufficient_liquidity(prefix));
		assert!(!sample_quote("anything", false).signals_insufficient_liquidity(""));
	}

	#[test]
	fn test_request_carries_one_constraint() {
		let request = QuoteRequest {
			pair_address: "pair".to_string(),
			order_type: OrderType::Market,
			side: OrderSide::Sell,
			token_address: "token".to_string(),
			amount: Decimal::from_str("1.5").unwrap(),
			platform_fee: Decimal::from_str("0.001").unwrap(),
			constraint: PriceConstraint::Slippage(Decimal::from_str("0.01").unwrap()),
		};

		let json = serde_json::to_value(&request).unwrap();
		assert_eq!(json["pairAddress"], "pair");
		assert_eq!(json["orderType"], "MARKET");
		assert!(json.get("slippage").is_some());
		assert!(json.get("price").is_none());
	}
}
