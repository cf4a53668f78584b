//! Order input types for the order construction state machine.
//!
//! This module defines the selectable order tabs and sides, the wire order type
//! derived from them, the two token legs of an order and the validation result
//! attached to every validated field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TokenInfo;

/// Selects which derived-amount computation applies to the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderTab {
	/// Executes immediately against the book, bounded by slippage.
	#[default]
	Market,
	/// Rests on the book at a user chosen price.
	Limit,
}

impl fmt::Display for OrderTab {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderTab::Market => write!(f, "MARKET"),
			OrderTab::Limit => write!(f, "LIMIT"),
		}
	}
}

impl FromStr for OrderTab {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"market" => Ok(OrderTab::Market),
			"limit" => Ok(OrderTab::Limit),
			other => Err(format!("Unknown order tab: {}", other)),
		}
	}
}

/// Direction of the order. Determines which leg is the target leg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
	#[default]
	Buy,
	Sell,
}

impl fmt::Display for OrderSide {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderSide::Buy => write!(f, "BUY"),
			OrderSide::Sell => write!(f, "SELL"),
		}
	}
}

impl FromStr for OrderSide {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"buy" => Ok(OrderSide::Buy),
			"sell" => Ok(OrderSide::Sell),
			other => Err(format!("Unknown order side: {}", other)),
		}
	}
}

/// Order type sent on the wire to the pricing engine and the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
	Market,
	Limit,
	/// Limit order that must never execute as taker.
	PostOnly,
}

impl OrderType {
	/// Derives the wire order type from the selected tab and the post-only flag.
	///
	/// The post-only flag only has meaning on the limit tab; market orders ignore it.
	pub fn from_tab(tab: OrderTab, prevent_immediate_execution: bool) -> Self {
		match (tab, prevent_immediate_execution) {
			(OrderTab::Market, _) => OrderType::Market,
			(OrderTab::Limit, false) => OrderType::Limit,
			(OrderTab::Limit, true) => OrderType::PostOnly,
		}
	}
}

impl fmt::Display for OrderType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderType::Market => write!(f, "MARKET"),
			OrderType::Limit => write!(f, "LIMIT"),
			OrderType::PostOnly => write!(f, "POSTONLY"),
		}
	}
}

/// Identifies one of the two legs of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegId {
	Leg1,
	Leg2,
}

impl LegId {
	/// Returns the other leg.
	pub fn other(self) -> Self {
		match self {
			LegId::Leg1 => LegId::Leg2,
			LegId::Leg2 => LegId::Leg1,
		}
	}

	/// Returns the leg whose amount the user specifies for the given side.
	///
	/// The target is leg2 on BUY and leg1 on SELL.
	pub fn target_for(side: OrderSide) -> Self {
		match side {
			OrderSide::Buy => LegId::Leg2,
			OrderSide::Sell => LegId::Leg1,
		}
	}
}

impl FromStr for LegId {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"1" | "leg1" => Ok(LegId::Leg1),
			"2" | "leg2" => Ok(LegId::Leg2),
			other => Err(format!("Unknown leg: {}", other)),
		}
	}
}

/// One side of the pair being traded.
///
/// `valid` and `message` cache the outcome of the last validation run by a
/// mutation handler or a quote outcome. They are not recomputed on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenLeg {
	/// Token address, mirrors the active pair.
	pub address: String,
	/// Token symbol (e.g., "XRD").
	pub symbol: String,
	/// Token icon location used by front ends.
	pub icon_url: String,
	/// Entered or quote-derived amount. `None` means unset.
	pub amount: Option<Decimal>,
	/// Known wallet balance for this token.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub balance: Option<Decimal>,
	/// Outcome of the last validation of this leg.
	pub valid: bool,
	/// Message attached by the last validation or quote outcome.
	pub message: String,
}

impl TokenLeg {
	/// Creates an empty, valid leg with no token identity.
	pub fn empty() -> Self {
		Self {
			valid: true,
			..Default::default()
		}
	}

	/// Creates a fresh, empty and valid leg for the given token.
	pub fn for_token(token: &TokenInfo) -> Self {
		Self {
			address: token.address.clone(),
			symbol: token.symbol.clone(),
			icon_url: token.icon_url.clone(),
			..Self::empty()
		}
	}

	/// Returns true when an amount strictly greater than zero is set.
	pub fn has_positive_amount(&self) -> bool {
		self.amount.is_some_and(|amount| amount > Decimal::ZERO)
	}
}

/// Outcome of validating a single field or the whole order.
///
/// A result can be valid and still carry a non-empty message, which is then
/// a warning that does not block submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
	pub valid: bool,
	pub message: String,
}

impl ValidationResult {
	/// A valid result without message.
	pub fn ok() -> Self {
		Self {
			valid: true,
			message: String::new(),
		}
	}

	/// A valid result carrying a warning.
	pub fn warning(message: impl Into<String>) -> Self {
		Self {
			valid: true,
			message: message.into(),
		}
	}

	/// An invalid result with the reason.
	pub fn invalid(message: impl Into<String>) -> Self {
		Self {
			valid: false,
			message: message.into(),
		}
	}

	/// Returns true when the result is valid but carries a message.
	pub fn is_warning(&self) -> bool {
		self.valid && !self.message.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_order_type_derivation() {
		assert_eq!(OrderType::from_tab(OrderTab::Market, false), OrderType::Market);
		assert_eq!(OrderType::from_tab(OrderTab::Market, true), OrderType::Market);
		assert_eq!(OrderType::from_tab(OrderTab::Limit, false), OrderType::Limit);
		assert_eq!(OrderType::from_tab(OrderTab::Limit, true), OrderType::PostOnly);
	}

	#[test]
	fn test_target_leg_per_side() {
		assert_eq!(LegId::target_for(OrderSide::Buy), LegId::Leg2);
		assert_eq!(LegId::target_for(OrderSide::Sell), LegId::Leg1);
		assert_eq!(LegId::Leg1.other(), LegId::Leg2);
	}

	#[test]
	fn test_wire_names() {
		assert_eq!(serde_json::to_string(&OrderType::PostOnly).unwrap(), "\"POSTONLY\"");
		assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "\"SELL\"");
		assert_eq!("Limit".parse::<OrderTab>().unwrap(), OrderTab::Limit);
		assert!("stop".parse::<OrderTab>().is_err());
	}

	#[test]
	fn test_fresh_leg_is_valid_and_unset() {
		let token = TokenInfo {
			address: "resource_xrd".to_string(),
			symbol: "XRD".to_string(),
			icon_url: String::new(),
		};
		let leg = TokenLeg::for_token(&token);
		assert!(leg.valid);
		assert!(leg.amount.is_none());
		assert!(!leg.has_positive_amount());
		assert_eq!(leg.symbol, "XRD");
	}
}
