//! Mock pricing engine for testing and development.
//!
//! Each configured pair has a mid price (quote token per base token) and an
//! optional base token liquidity. Market orders fill at the mid price, capped by
//! the available liquidity. Limit orders fill at their own price when they
//! cross the mid price and rest on the book otherwise.

use crate::{PricingEngineInterface, PricingError, PricingFactory, PricingRegistry};
use async_trait::async_trait;
use order_types::{
	display_amount, ConfigSchema, Field, FieldType, ImplementationRegistry, OrderSide,
	PriceConstraint, Quote, QuoteRequest, Schema, TokenInfo, ValidationError,
	DEFAULT_LIQUIDITY_MESSAGE_PREFIX,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the mock pricing engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockPricingConfig {
	/// Fails every request with a network error when set.
	#[serde(default)]
	pub fail: bool,
	/// Simulated books keyed by pair address.
	#[serde(default)]
	pub pairs: HashMap<String, MockBook>,
}

/// Simulated order book of one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockBook {
	pub base: String,
	pub base_symbol: String,
	pub quote: String,
	pub quote_symbol: String,
	/// Mid price in quote tokens per base token.
	pub price: Decimal,
	/// Base tokens that can be filled. Unlimited when absent.
	pub base_liquidity: Option<Decimal>,
}

impl MockBook {
	fn base_token(&self) -> TokenInfo {
		TokenInfo {
			address: self.base.clone(),
			symbol: self.base_symbol.clone(),
			icon_url: String::new(),
		}
	}

	fn quote_token(&self) -> TokenInfo {
		TokenInfo {
			address: self.quote.clone(),
			symbol: self.quote_symbol.clone(),
			icon_url: String::new(),
		}
	}
}

/// Configuration schema for the mock pricing engine.
pub struct MockPricingSchema;

impl ConfigSchema for MockPricingSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let book = Schema::new(
			vec![
				Field::new("base", FieldType::String),
				Field::new("base_symbol", FieldType::String),
				Field::new("quote", FieldType::String),
				Field::new("quote_symbol", FieldType::String),
				Field::new(
					"price",
					FieldType::Decimal {
						min: Some(Decimal::ZERO),
						max: None,
					},
				)
				.with_validator(|value| {
					match order_types::decimal_from_toml(value) {
						Some(price) if price > Decimal::ZERO => Ok(()),
						_ => Err("price must be greater than 0".to_string()),
					}
				}),
			],
			vec![Field::new(
				"base_liquidity",
				FieldType::Decimal {
					min: Some(Decimal::ZERO),
					max: None,
				},
			)],
		);

		let schema = Schema::new(
			vec![],
			vec![
				Field::new("fail", FieldType::Boolean),
				Field::new("pairs", FieldType::Map(book)),
			],
		);
		schema.validate(config)
	}
}

/// Mock pricing engine backed by static books.
pub struct MockPricingEngine {
	config: MockPricingConfig,
}

impl MockPricingEngine {
	pub fn new(config: MockPricingConfig) -> Self {
		Self { config }
	}
}

fn checked(value: Option<Decimal>) -> Result<Decimal, PricingError> {
	value.ok_or_else(|| PricingError::Internal("Arithmetic overflow".to_string()))
}

#[async_trait]
impl PricingEngineInterface for MockPricingEngine {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockPricingSchema)
	}

	async fn quote(&self, request: &QuoteRequest) -> Result<Quote, PricingError> {
		if self.config.fail {
			return Err(PricingError::Network(
				"Simulated pricing engine failure".to_string(),
			));
		}

		let book = self
			.config
			.pairs
			.get(&request.pair_address)
			.ok_or_else(|| PricingError::PairNotSupported(request.pair_address.clone()))?;

		let (target, counter) = if request.token_address == book.base {
			(book.base_token(), book.quote_token())
		} else if request.token_address == book.quote {
			(book.quote_token(), book.base_token())
		} else {
			return Err(PricingError::Internal(format!(
				"Token {} is not part of pair {}",
				request.token_address, request.pair_address
			)));
		};
		let target_is_base = target.address == book.base;

		let price = match request.constraint {
			PriceConstraint::Slippage(_) => book.price,
			PriceConstraint::Price(limit) => {
				if limit <= Decimal::ZERO {
					return Err(PricingError::Internal(
						"Price must be greater than 0".to_string(),
					));
				}
				// Crossing is judged against the book price for the side of the order
				let crosses = match request.side {
					OrderSide::Buy => limit >= book.price,
					OrderSide::Sell => limit <= book.price,
				};
				if !crosses {
					let (from_token, to_token) = match request.side {
						OrderSide::Sell => (target, counter),
						OrderSide::Buy => (counter, target),
					};
					return Ok(Quote {
						from_amount: Decimal::ZERO,
						to_amount: Decimal::ZERO,
						from_token,
						to_token,
						message: format!("Order rests on the book at {}", limit.normalize()),
						insufficient_liquidity: false,
					});
				}
				limit
			},
		};

		let base_quantity = if target_is_base {
			request.amount
		} else {
			checked(request.amount.checked_div(price))?
		};

		let mut filled = request.amount;
		let mut message = String::new();
		let mut insufficient_liquidity = false;
		if let Some(liquidity) = book.base_liquidity {
			if base_quantity > liquidity {
				filled = if target_is_base {
					liquidity
				} else {
					checked(liquidity.checked_mul(price))?
				};
				insufficient_liquidity = true;
				message = format!(
					"{}. Only {} {} can be filled.",
					DEFAULT_LIQUIDITY_MESSAGE_PREFIX,
					display_amount(filled, 8),
					target.symbol
				);
			}
		}

		let converted = if target_is_base {
			checked(filled.checked_mul(price))?
		} else {
			checked(filled.checked_div(price))?
		};

		let quote = match request.side {
			OrderSide::Sell => Quote {
				from_amount: filled,
				to_amount: checked(converted.checked_mul(Decimal::ONE - request.platform_fee))?,
				from_token: target,
				to_token: counter,
				message,
				insufficient_liquidity,
			},
			OrderSide::Buy => Quote {
				from_amount: checked(converted.checked_mul(Decimal::ONE + request.platform_fee))?,
				to_amount: filled,
				from_token: counter,
				to_token: target,
				message,
				insufficient_liquidity,
			},
		};
		Ok(quote)
	}
}

/// Registry for the mock pricing engine implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = PricingFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PricingEngineInterface>, PricingError> {
			let mock_config: MockPricingConfig = config.clone().try_into().map_err(|e| {
				PricingError::Configuration(format!("Invalid mock pricing config: {}", e))
			})?;

			Ok(Box::new(MockPricingEngine::new(mock_config)))
		}
	}
}

impl PricingRegistry for Registry {}
