//! Main entry point for the order input service.
//!
//! This binary runs an interactive trading session on one configured market.
//! Commands are read line by line from standard input and every result is
//! printed to standard output as a JSON document; logs go to standard error.

use clap::Parser;
use order_config::Config;
use order_core::{OrderEngine, OrderEngineBuilder, OrderEngineFactories};
use order_pricing::PricingFactory;
use order_signer::SignerFactory;
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, BufReader};

mod commands;
mod session;

use commands::Command;
use session::Session;

/// Command-line arguments for the order input service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/demo.toml")]
	config: String,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Pair address of the market to open, defaults to the first configured market
	#[arg(short, long, env = "ORDER_MARKET")]
	market: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	tracing::info!("Started order input service");

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.session.id);

	let market = match args.market.clone() {
		Some(market) => market,
		None => config
			.markets
			.first()
			.map(|market| market.address.clone())
			.ok_or("No market configured")?,
	};

	let engine = build_engine(config).await?;
	let logger = session::spawn_event_logger(&engine);
	let mut session = Session::open(engine, &market).await?;
	tracing::info!(
		account = session.context().account.as_deref().unwrap_or("-"),
		"Session ready, type `help` for commands"
	);

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	loop {
		let line = tokio::select! {
			line = lines.next_line() => line?,
			_ = tokio::signal::ctrl_c() => {
				tracing::info!("Received shutdown signal");
				break;
			}
		};
		let Some(line) = line else { break };
		if line.trim().is_empty() {
			continue;
		}

		let command = match line.parse::<Command>() {
			Ok(command) => command,
			Err(e) => {
				print_json(&serde_json::json!({ "error": e.to_string() }))?;
				continue;
			},
		};
		let quit = command == Command::Quit;
		match session.execute(command).await {
			Ok(result) => print_json(&result)?,
			Err(e) => {
				tracing::warn!(error = %e, "Command failed");
				print_json(&serde_json::json!({ "error": e.to_string() }))?;
			},
		}
		if quit {
			break;
		}
	}

	logger.abort();
	tracing::info!("Stopped order input service");
	Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), serde_json::Error> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

/// All pricing engine factories known to this binary.
pub(crate) fn pricing_factories() -> HashMap<String, PricingFactory> {
	order_pricing::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

/// All signer factories known to this binary.
pub(crate) fn signer_factories() -> HashMap<String, SignerFactory> {
	order_signer::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

/// Builds the order engine with all registered implementations.
async fn build_engine(config: Config) -> Result<OrderEngine, Box<dyn std::error::Error>> {
	let factories = OrderEngineFactories {
		pricing_factories: pricing_factories(),
		signer_factories: signer_factories(),
	};
	Ok(OrderEngineBuilder::new(config).build(factories).await?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[tokio::test]
	async fn test_build_engine_from_file() {
		let mut file = NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
[session]
id = "file-session"

[pricing]
primary = "mock"
[pricing.implementations.mock.pairs.component_a]
base = "resource_a"
base_symbol = "AAA"
quote = "resource_b"
quote_symbol = "BBB"
price = "2"

[[markets]]
address = "component_a"
price_max_decimals = 2
token1 = {{ address = "resource_a", symbol = "AAA" }}
token2 = {{ address = "resource_b", symbol = "BBB" }}
"#
		)
		.unwrap();

		let config = Config::from_file(file.path().to_str().unwrap()).await.unwrap();
		let engine = build_engine(config).await.unwrap();
		assert!(engine.account().is_none());

		let mut session = Session::open(engine, "component_a").await.unwrap();
		let result = session.execute(Command::Submit).await;
		assert_eq!(
			result.unwrap_err().to_string(),
			"Precondition failed: Wallet signer is not initialized yet."
		);
	}
}
