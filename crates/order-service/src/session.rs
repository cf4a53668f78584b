//! Interactive trading session.
//!
//! Holds the engine and the trading context of the selected market, and maps
//! each [`Command`] onto the matching engine operation. Results are rendered as
//! JSON values for the caller to print.

use crate::commands::{Command, HELP};
use order_config::Config;
use order_core::{OrderEngine, OrderInputError, QuoteOutcome};
use order_types::{SessionEvent, TokenInfo, TradingContext};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur while executing a session command.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("Unknown market: {0}")]
	UnknownMarket(String),
	#[error("Unknown token: {0}")]
	UnknownToken(String),
	#[error(transparent)]
	Order(#[from] OrderInputError),
}

/// Builds the trading context of a configured market.
pub fn market_context(
	config: &Config,
	address: &str,
	account: Option<&str>,
) -> Result<TradingContext, SessionError> {
	let market = config
		.market(address)
		.ok_or_else(|| SessionError::UnknownMarket(address.to_string()))?;
	let context = TradingContext::new(market.pair_info(&config.exchange))
		.with_book(market.best_buy, market.best_sell);
	Ok(match account {
		Some(account) => context.with_account(account),
		None => context,
	})
}

/// A session over one order engine.
pub struct Session {
	engine: OrderEngine,
	context: TradingContext,
}

impl Session {
	/// Opens a session on the given market and selects its pair.
	pub async fn open(engine: OrderEngine, address: &str) -> Result<Self, SessionError> {
		let context = market_context(engine.config(), address, engine.account())?;
		engine.set_pair(&context).await;
		tracing::info!(pair = %order_types::truncate_id(address), "Selected market");
		Ok(Self { engine, context })
	}

	pub fn context(&self) -> &TradingContext {
		&self.context
	}

	/// Executes a command and returns its rendered result.
	pub async fn execute(&mut self, command: Command) -> Result<Value, SessionError> {
		let engine = &self.engine;
		let context = &self.context;
		match command {
			Command::Pair(address) => {
				let next = market_context(engine.config(), &address, engine.account())?;
				engine.set_pair(&next).await;
				self.context = next;
				tracing::info!(pair = %order_types::truncate_id(&address), "Selected market");
			},
			Command::Tab(tab) => engine.set_active_tab(tab).await,
			Command::Side(side) => engine.set_side(side).await,
			Command::Amount(leg, amount) => engine.set_amount(leg, amount, context).await,
			Command::Price(price) => engine.set_price(price).await,
			Command::BestPrice => engine.use_best_price(context).await,
			Command::Slippage(slippage) => engine.set_slippage(slippage).await,
			Command::PostOnly => engine.toggle_prevent_immediate_execution().await,
			Command::Swap => engine.swap_legs().await,
			Command::Balance(address, balance) => {
				let token = self.token(&address)?;
				engine.set_balance(&token, balance, context).await;
			},
			Command::Book(best_buy, best_sell) => {
				self.context.best_buy = best_buy;
				self.context.best_sell = best_sell;
			},
			Command::Quote => {
				return Ok(match engine.fetch_quote(context).await? {
					QuoteOutcome::Applied(quote) => json!({
						"quote": quote,
						"state": engine.snapshot().await,
					}),
					QuoteOutcome::Failed(error) => json!({
						"error": error,
						"state": engine.snapshot().await,
					}),
					QuoteOutcome::Discarded => json!({ "discarded": true }),
				});
			},
			Command::Submit => {
				let outcome = engine.submit_order(context).await?;
				return Ok(json!({ "outcome": outcome }));
			},
			Command::Validate => {
				return Ok(json!({
					"order": engine.validate_order(context).await,
					"price": engine.validate_price(context).await,
					"slippage": engine.validate_slippage().await,
				}));
			},
			Command::Help => return Ok(Value::String(HELP.to_string())),
			Command::Show | Command::Quit => {},
		}
		Ok(json!({ "state": engine.snapshot().await }))
	}

	fn token(&self, address: &str) -> Result<TokenInfo, SessionError> {
		let pair = &self.context.pair;
		[&pair.token1, &pair.token2]
			.into_iter()
			.find(|token| token.address == address)
			.cloned()
			.ok_or_else(|| SessionError::UnknownToken(address.to_string()))
	}
}

/// Logs session events until the bus is closed.
///
/// Refresh requests have no consumer in this binary; they are logged so the
/// operator can see when balances and history would be reloaded.
pub fn spawn_event_logger(engine: &OrderEngine) -> tokio::task::JoinHandle<()> {
	let mut receiver = engine.event_bus().subscribe();
	tokio::spawn(async move {
		loop {
			match receiver.recv().await {
				Ok(SessionEvent::Refresh(refresh)) => {
					tracing::info!(?refresh, "Refresh requested");
				},
				Ok(event) => tracing::debug!(?event, "Session event"),
				Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
					tracing::warn!(skipped, "Event logger lagged behind");
				},
				Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
			}
		}
	})
}
