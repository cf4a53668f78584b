//! Line commands accepted by the interactive session.

use order_types::{LegId, OrderSide, OrderTab};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while parsing a command line.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
	#[error("Unknown command: {0}")]
	Unknown(String),
	#[error("Usage: {0}")]
	Usage(&'static str),
	#[error("Invalid argument: {0}")]
	Argument(String),
}

/// A single session command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	/// Switches to the market with the given pair address.
	Pair(String),
	Tab(OrderTab),
	Side(OrderSide),
	/// Sets or clears (`-`) the amount of a leg.
	Amount(LegId, Option<Decimal>),
	Price(Decimal),
	BestPrice,
	Slippage(Decimal),
	PostOnly,
	Swap,
	/// Reports a wallet balance for a token address.
	Balance(String, Decimal),
	/// Replaces the best buy and best sell prices of the book (`-` for an empty side).
	Book(Option<Decimal>, Option<Decimal>),
	Quote,
	Submit,
	Validate,
	Show,
	Help,
	Quit,
}

pub const HELP: &str = "\
pair <address>             switch market
tab <market|limit>         select order tab
side <buy|sell>            select order side
amount <1|2> <value|->     set or clear a leg amount
price <value>              set limit price
best-price                 use best price of the book
slippage <value>           set slippage fraction
post-only                  toggle post-only
swap                       swap legs
balance <token> <value>    report wallet balance
book <buy|-> <sell|->      update best prices
quote                      fetch quote
submit                     submit order
validate                   show validation results
show                       print order state
quit                       leave the session";

fn decimal(value: &str) -> Result<Decimal, CommandError> {
	Decimal::from_str(value).map_err(|_| CommandError::Argument(format!("not a number: {}", value)))
}

fn optional_decimal(value: &str) -> Result<Option<Decimal>, CommandError> {
	match value {
		"-" => Ok(None),
		value => decimal(value).map(Some),
	}
}

impl FromStr for Command {
	type Err = CommandError;

	fn from_str(line: &str) -> Result<Self, Self::Err> {
		let parts: Vec<&str> = line.split_whitespace().collect();
		let Some((&name, args)) = parts.split_first() else {
			return Err(CommandError::Usage("help"));
		};

		match (name.to_ascii_lowercase().as_str(), args) {
			("pair", [address]) => Ok(Command::Pair(address.to_string())),
			("pair", _) => Err(CommandError::Usage("pair <address>")),
			("tab", [tab]) => tab.parse().map(Command::Tab).map_err(CommandError::Argument),
			("tab", _) => Err(CommandError::Usage("tab <market|limit>")),
			("side", [side]) => side.parse().map(Command::Side).map_err(CommandError::Argument),
			("side", _) => Err(CommandError::Usage("side <buy|sell>")),
			("amount", [leg, value]) => Ok(Command::Amount(
				leg.parse().map_err(CommandError::Argument)?,
				optional_decimal(value)?,
			)),
			("amount", _) => Err(CommandError::Usage("amount <1|2> <value|->")),
			("price", [value]) => Ok(Command::Price(decimal(value)?)),
			("price", _) => Err(CommandError::Usage("price <value>")),
			("best-price", []) => Ok(Command::BestPrice),
			("slippage", [value]) => Ok(Command::Slippage(decimal(value)?)),
			("slippage", _) => Err(CommandError::Usage("slippage <value>")),
			("post-only", []) => Ok(Command::PostOnly),
			("swap", []) => Ok(Command::Swap),
			("balance", [token, value]) => Ok(Command::Balance(token.to_string(), decimal(value)?)),
			("balance", _) => Err(CommandError::Usage("balance <token> <value>")),
			("book", [buy, sell]) => Ok(Command::Book(
				optional_decimal(buy)?,
				optional_decimal(sell)?,
			)),
			("book", _) => Err(CommandError::Usage("book <buy|-> <sell|->")),
			("quote", []) => Ok(Command::Quote),
			("submit", []) => Ok(Command::Submit),
			("validate", []) => Ok(Command::Validate),
			("show", []) => Ok(Command::Show),
			("help", []) => Ok(Command::Help),
			("quit" | "exit", []) => Ok(Command::Quit),
			_ => Err(CommandError::Unknown(line.trim().to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dec(s: &str) -> Decimal {
		Decimal::from_str(s).unwrap()
	}

	#[test]
	fn test_parse_order_inputs() {
		assert_eq!(
			"amount 1 12.5".parse::<Command>().unwrap(),
			Command::Amount(LegId::Leg1, Some(dec("12.5")))
		);
		assert_eq!(
			"amount 2 -".parse::<Command>().unwrap(),
			Command::Amount(LegId::Leg2, None)
		);
		assert_eq!(
			"  TAB  Limit ".parse::<Command>().unwrap(),
			Command::Tab(OrderTab::Limit)
		);
		assert_eq!(
			"book - 0.051".parse::<Command>().unwrap(),
			Command::Book(None, Some(dec("0.051")))
		);
		assert_eq!(
			"balance resource_xrd 1000".parse::<Command>().unwrap(),
			Command::Balance("resource_xrd".to_string(), dec("1000"))
		);
		assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
	}

	#[test]
	fn test_parse_errors() {
		assert_eq!(
			"price".parse::<Command>().unwrap_err(),
			CommandError::Usage("price <value>")
		);
		assert_eq!(
			"side up".parse::<Command>().unwrap_err(),
			CommandError::Argument("Unknown order side: up".to_string())
		);
		assert!(matches!(
			"slippage lots".parse::<Command>(),
			Err(CommandError::Argument(_))
		));
		assert!(matches!(
			"launch rocket".parse::<Command>(),
			Err(CommandError::Unknown(_))
		));
		assert!(matches!("amount 3 1".parse::<Command>(), Err(CommandError::Argument(_))));
	}
}
