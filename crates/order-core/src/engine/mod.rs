//! Order engine managing one in-progress order of a trading session.
//!
//! The engine owns the order input state and exposes the synchronous mutation
//! handlers, the validation results and the two asynchronous workflows. The
//! active pair, the account and the best prices are never stored here: callers
//! pass them in as a [`TradingContext`] on every call that needs them.

pub mod event_bus;

use crate::handlers::{QuoteHandler, QuoteOutcome, SubmissionHandler};
use crate::state::{OrderInputState, OrderInputStore};
use crate::validation;
use crate::OrderInputError;
use order_config::Config;
use order_pricing::PricingService;
use order_signer::SignerService;
use order_types::{
	LegId, OrderSide, OrderTab, TokenInfo, TradingContext, TransactionOutcome, ValidationResult,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Order engine for a single trading session.
#[derive(Clone)]
pub struct OrderEngine {
	/// Session configuration.
	config: Config,
	/// Shared order input state.
	store: OrderInputStore,
	/// Quote retrieval workflow.
	quote_handler: Arc<QuoteHandler>,
	/// Order submission workflow.
	submission_handler: Arc<SubmissionHandler>,
	/// Event bus for workflow milestones and refresh requests.
	event_bus: event_bus::EventBus,
	/// Account connected through the signer, fetched once at build time.
	account: Option<String>,
}

impl OrderEngine {
	/// Creates an engine with a fresh order state.
	///
	/// Without a signer the session has no wallet and every submission fails
	/// its preconditions.
	pub fn new(
		config: Config,
		pricing: Arc<PricingService>,
		signer: Option<Arc<SignerService>>,
		event_bus: event_bus::EventBus,
	) -> Self {
		let store = OrderInputStore::new(OrderInputState::new(config.exchange.default_slippage));

		let quote_handler = Arc::new(QuoteHandler::new(
			pricing,
			store.clone(),
			config.exchange.clone(),
			event_bus.clone(),
		));
		let submission_handler = Arc::new(SubmissionHandler::new(
			signer,
			store.clone(),
			config.exchange.clone(),
			event_bus.clone(),
		));

		Self {
			config,
			store,
			quote_handler,
			submission_handler,
			event_bus,
			account: None,
		}
	}

	/// Records the account connected through the signer.
	pub fn with_account(mut self, account: impl Into<String>) -> Self {
		self.account = Some(account.into());
		self
	}

	/// Account connected through the signer, if any.
	pub fn account(&self) -> Option<&str> {
		self.account.as_deref()
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a copy of the current order state.
	pub async fn snapshot(&self) -> OrderInputState {
		self.store.snapshot().await
	}

	pub async fn set_active_tab(&self, tab: OrderTab) {
		self.store.update_with(|state| state.set_active_tab(tab)).await
	}

	pub async fn set_pair(&self, context: &TradingContext) {
		self.store.update_with(|state| state.set_pair(context)).await
	}

	pub async fn set_balance(&self, token: &TokenInfo, balance: Decimal, context: &TradingContext) {
		self.store
			.update_with(|state| state.set_balance(token, balance, context))
			.await
	}

	pub async fn set_amount(&self, leg: LegId, amount: Option<Decimal>, context: &TradingContext) {
		self.store
			.update_with(|state| state.set_amount(leg, amount, context))
			.await
	}

	pub async fn swap_legs(&self) {
		self.store.update_with(|state| state.swap_legs()).await
	}

	pub async fn set_side(&self, side: OrderSide) {
		self.store.update_with(|state| state.set_side(side)).await
	}

	pub async fn set_price(&self, price: Decimal) {
		self.store.update_with(|state| state.set_price(price)).await
	}

	pub async fn set_slippage(&self, slippage: Decimal) {
		self.store.update_with(|state| state.set_slippage(slippage)).await
	}

	pub async fn toggle_prevent_immediate_execution(&self) {
		self.store
			.update_with(|state| state.toggle_prevent_immediate_execution())
			.await
	}

	pub async fn use_best_price(&self, context: &TradingContext) {
		self.store
			.update_with(|state| state.use_best_price(context))
			.await
	}

	/// Aggregate validity of the current order.
	pub async fn validate_order(&self, context: &TradingContext) -> ValidationResult {
		self.store
			.read_with(|state| validation::validate_order(state, context))
			.await
	}

	/// Validity of the current limit price.
	pub async fn validate_price(&self, context: &TradingContext) -> ValidationResult {
		self.store
			.read_with(|state| validation::validate_price(state.price, state.side, context))
			.await
	}

	/// Validity of the current slippage.
	pub async fn validate_slippage(&self) -> ValidationResult {
		self.store
			.read_with(|state| validation::validate_slippage(state.slippage))
			.await
	}

	/// Retrieves a quote for the current order. See [`QuoteHandler::fetch_quote`].
	pub async fn fetch_quote(
		&self,
		context: &TradingContext,
	) -> Result<QuoteOutcome, OrderInputError> {
		self.quote_handler.fetch_quote(context).await
	}

	/// Submits the current order. See [`SubmissionHandler::submit_order`].
	pub async fn submit_order(
		&self,
		context: &TradingContext,
	) -> Result<TransactionOutcome, OrderInputError> {
		self.submission_handler.submit_order(context).await
	}
}
