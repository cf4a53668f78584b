//! Trading pair and session context types.
//!
//! The order engine never reads ambient state: the active pair, the connected
//! account and the best prices of the order book are handed to validation and
//! workflows as an explicit, read-only [`TradingContext`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default number of decimal places accepted for order amounts.
pub const DEFAULT_AMOUNT_MAX_DECIMALS: u32 = 8;

/// Identity of a token as published by the exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
	/// Token address.
	pub address: String,
	/// Token symbol.
	pub symbol: String,
	/// Token icon location.
	#[serde(default)]
	pub icon_url: String,
}

/// A trading pair with its precision rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairInfo {
	/// Pair component address.
	pub address: String,
	/// Base token, mapped onto leg1 when the pair is selected.
	pub token1: TokenInfo,
	/// Quote token, mapped onto leg2 when the pair is selected.
	pub token2: TokenInfo,
	/// Maximum number of decimal places accepted for a limit price.
	pub price_max_decimals: u32,
	/// Maximum number of decimal places accepted for an amount.
	#[serde(default = "default_amount_max_decimals")]
	pub amount_max_decimals: u32,
}

fn default_amount_max_decimals() -> u32 {
	DEFAULT_AMOUNT_MAX_DECIMALS
}

/// Read-only context used by validation and by both workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingContext {
	/// Active trading pair.
	pub pair: PairInfo,
	/// Address of the connected account, if a wallet session exists.
	#[serde(default)]
	pub account: Option<String>,
	/// Best price on the buy side of the book.
	#[serde(default)]
	pub best_buy: Option<Decimal>,
	/// Best price on the sell side of the book.
	#[serde(default)]
	pub best_sell: Option<Decimal>,
}

impl TradingContext {
	/// Creates a context for the given pair with an empty book and no account.
	pub fn new(pair: PairInfo) -> Self {
		Self {
			pair,
			account: None,
			best_buy: None,
			best_sell: None,
		}
	}

	/// Sets the connected account address.
	pub fn with_account(mut self, account: impl Into<String>) -> Self {
		self.account = Some(account.into());
		self
	}

	/// Sets the best buy and best sell prices of the book.
	pub fn with_book(mut self, best_buy: Option<Decimal>, best_sell: Option<Decimal>) -> Self {
		self.best_buy = best_buy;
		self.best_sell = best_sell;
		self
	}
}
