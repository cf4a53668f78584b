//! Configuration module for the order input system.
//!
//! This module provides structures and utilities for loading the session
//! configuration from TOML. Environment variables written as `${VAR}` or
//! `${VAR:-default}` are resolved before parsing, and the result is validated
//! before it is handed to the engine builder.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["markets.toml", "pricing.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use order_types::{
	PairInfo, TokenInfo, DEFAULT_AMOUNT_MAX_DECIMALS, DEFAULT_LIQUIDITY_MESSAGE_PREFIX,
};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound for any configured number of decimal places.
const MAX_CONFIGURED_DECIMALS: u32 = 18;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for an order input session.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Session identity.
	pub session: SessionConfig,
	/// Exchange-wide rules and fee identifiers.
	#[serde(default)]
	pub exchange: ExchangeConfig,
	/// Pricing engine implementations.
	pub pricing: PricingConfig,
	/// Signer implementations. Absent when no wallet session is available.
	pub signer: Option<SignerConfig>,
	/// Event bus settings.
	#[serde(default)]
	pub events: EventsConfig,
	/// Trading pairs known to the session.
	#[serde(default)]
	pub markets: Vec<MarketConfig>,
}

/// Configuration specific to the session instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Identifier used in logs.
	pub id: String,
}

/// Exchange-wide rules applied to every order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeConfig {
	/// Maximum number of decimal places for order amounts.
	#[serde(default = "default_amount_max_decimals")]
	pub amount_max_decimals: u32,
	/// Platform fee fraction sent with every quote request.
	#[serde(default = "default_platform_fee")]
	pub platform_fee: Decimal,
	/// Platform badge sent with every transaction.
	#[serde(default = "default_platform_badge_id")]
	pub platform_badge_id: u32,
	/// Slippage a fresh session starts with.
	#[serde(default = "default_slippage")]
	pub default_slippage: Decimal,
	/// Prefix of pricing engine messages that signal a liquidity shortfall.
	#[serde(default = "default_liquidity_message_prefix")]
	pub liquidity_message_prefix: String,
}

impl Default for ExchangeConfig {
	fn default() -> Self {
		Self {
			amount_max_decimals: default_amount_max_decimals(),
			platform_fee: default_platform_fee(),
			platform_badge_id: default_platform_badge_id(),
			default_slippage: default_slippage(),
			liquidity_message_prefix: default_liquidity_message_prefix(),
		}
	}
}

fn default_amount_max_decimals() -> u32 {
	DEFAULT_AMOUNT_MAX_DECIMALS
}

fn default_platform_fee() -> Decimal {
	Decimal::new(1, 3) // 0.001
}

fn default_platform_badge_id() -> u32 {
	1
}

fn default_slippage() -> Decimal {
	Decimal::new(1, 2) // 0.01
}

fn default_liquidity_message_prefix() -> String {
	DEFAULT_LIQUIDITY_MESSAGE_PREFIX.to_string()
}

/// Configuration for the pricing engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of implementation names to their raw configuration tables.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the wallet signer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignerConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of implementation names to their raw configuration tables.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the event bus.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventsConfig {
	/// Capacity of the broadcast channel.
	#[serde(default = "default_event_capacity")]
	pub capacity: usize,
}

impl Default for EventsConfig {
	fn default() -> Self {
		Self {
			capacity: default_event_capacity(),
		}
	}
}

fn default_event_capacity() -> usize {
	1000
}

/// A trading pair with a snapshot of its order book.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
	/// Pair component address.
	pub address: String,
	pub token1: TokenInfo,
	pub token2: TokenInfo,
	/// Maximum number of decimal places for a limit price on this pair.
	pub price_max_decimals: u32,
	/// Overrides the exchange-wide amount precision for this pair.
	pub amount_max_decimals: Option<u32>,
	pub best_buy: Option<Decimal>,
	pub best_sell: Option<Decimal>,
}

impl MarketConfig {
	/// Builds the pair description used by the engine.
	pub fn pair_info(&self, exchange: &ExchangeConfig) -> PairInfo {
		PairInfo {
			address: self.address.clone(),
			token1: self.token1.clone(),
			token2: self.token2.clone(),
			price_max_decimals: self.price_max_decimals,
			amount_max_decimals: self
				.amount_max_decimals
				.unwrap_or(exchange.amount_max_decimals),
		}
	}
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;
	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};
		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Converts an already resolved TOML document into a validated configuration.
	pub(crate) fn from_value(value: toml::Value) -> Result<Self, ConfigError> {
		let config: Config = value.try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Looks up a configured market by pair address.
	pub fn market(&self, address: &str) -> Option<&MarketConfig> {
		self.markets.iter().find(|m| m.address == address)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.session.id.is_empty() {
			return Err(ConfigError::Validation("Session ID cannot be empty".into()));
		}

		let exchange = &self.exchange;
		if exchange.amount_max_decimals > MAX_CONFIGURED_DECIMALS {
			return Err(ConfigError::Validation(format!(
				"amount_max_decimals cannot exceed {}",
				MAX_CONFIGURED_DECIMALS
			)));
		}
		if exchange.platform_fee < Decimal::ZERO || exchange.platform_fee >= Decimal::ONE {
			return Err(ConfigError::Validation(
				"platform_fee must be in the range [0, 1)".into(),
			));
		}
		if exchange.default_slippage < Decimal::ZERO || exchange.default_slippage > Decimal::ONE {
			return Err(ConfigError::Validation(
				"default_slippage must be in the range [0, 1]".into(),
			));
		}

		if self.pricing.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one pricing implementation must be configured".into(),
			));
		}
		if !self
			.pricing
			.implementations
			.contains_key(&self.pricing.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary pricing '{}' not found in implementations",
				self.pricing.primary
			)));
		}

		if let Some(signer) = &self.signer {
			if !signer.implementations.contains_key(&signer.primary) {
				return Err(ConfigError::Validation(format!(
					"Primary signer '{}' not found in implementations",
					signer.primary
				)));
			}
		}

		if self.events.capacity == 0 {
			return Err(ConfigError::Validation(
				"Event bus capacity must be greater than 0".into(),
			));
		}

		self.validate_markets()
	}

	/// Validates market definitions.
	///
	/// Pair addresses must be unique, the two tokens of a pair must differ and
	/// precision settings must stay within the supported range.
	fn validate_markets(&self) -> Result<(), ConfigError> {
		let mut seen = HashSet::new();
		for market in &self.markets {
			if market.address.is_empty() {
				return Err(ConfigError::Validation(
					"Market address cannot be empty".into(),
				));
			}
			if !seen.insert(market.address.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate market '{}'",
					market.address
				)));
			}
			if market.token1.address == market.token2.address {
				return Err(ConfigError::Validation(format!(
					"Market '{}' must reference two distinct tokens",
					market.address
				)));
			}
			let amount_decimals = market.amount_max_decimals.unwrap_or(0);
			if market.price_max_decimals > MAX_CONFIGURED_DECIMALS
				|| amount_decimals > MAX_CONFIGURED_DECIMALS
			{
				return Err(ConfigError::Validation(format!(
					"Market '{}' precision cannot exceed {} decimals",
					market.address, MAX_CONFIGURED_DECIMALS
				)));
			}
		}
		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let value: toml::Value = toml::from_str(&resolved)?;
		Config::from_value(value)
	}
}

/// Minimal valid configuration with a mock pricing engine, a local signer and one market.
#[cfg(any(test, feature = "testing"))]
pub fn test_config() -> Config {
	const TEST_CONFIG: &str = r#"
[session]
id = "test-session"

[pricing]
primary = "mock"
[pricing.implementations.mock.pairs.component_xrd_usdc]
base = "resource_xrd"
base_symbol = "XRD"
quote = "resource_usdc"
quote_symbol = "USDC"
price = "0.05"
base_liquidity = "100000"

[signer]
primary = "local"
[signer.implementations.local]
approve = true

[[markets]]
address = "component_xrd_usdc"
price_max_decimals = 4
best_buy = "0.049"
best_sell = "0.051"
token1 = { address = "resource_xrd", symbol = "XRD" }
token2 = { address = "resource_usdc", symbol = "USDC" }
"#;
	match TEST_CONFIG.parse() {
		Ok(config) => config,
		Err(e) => panic!("built-in test configuration is invalid: {}", e),
	}
}
