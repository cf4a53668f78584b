//! Quote retrieval workflow.
//!
//! Builds a quote request from the current order, sends it to the pricing
//! engine and maps the response back into the order. Each request is tied to a
//! ticket so that a response overtaken by a newer request is discarded.

use crate::engine::event_bus::EventBus;
use crate::state::OrderInputStore;
use crate::OrderInputError;
use order_config::ExchangeConfig;
use order_pricing::PricingService;
use order_types::{
	truncate_id, OrderTab, PriceConstraint, Quote, QuoteEvent, QuoteRequest, SessionEvent,
	TradingContext,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

/// Result of a quote round that passed its preconditions.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
	/// The quote was written into the order.
	Applied(Quote),
	/// The pricing engine failed and the target leg was marked invalid.
	Failed(String),
	/// A newer request was issued meanwhile; the response was dropped.
	Discarded,
}

/// Handler for the quote retrieval workflow.
pub struct QuoteHandler {
	pricing: Arc<PricingService>,
	store: OrderInputStore,
	exchange: ExchangeConfig,
	event_bus: EventBus,
}

impl QuoteHandler {
	pub fn new(
		pricing: Arc<PricingService>,
		store: OrderInputStore,
		exchange: ExchangeConfig,
		event_bus: EventBus,
	) -> Self {
		Self {
			pricing,
			store,
			exchange,
			event_bus,
		}
	}

	/// Fetches a quote for the target leg amount and applies it.
	///
	/// Fails without touching the state when no pair is active or the target leg
	/// has no positive amount. Engine failures are recovered into the state.
	#[instrument(skip_all, fields(pair = %truncate_id(&context.pair.address)))]
	pub async fn fetch_quote(
		&self,
		context: &TradingContext,
	) -> Result<QuoteOutcome, OrderInputError> {
		let (ticket, request) = self
			.store
			.update_with(|state| {
				if context.pair.address.is_empty() {
					return Err(OrderInputError::Precondition(
						"Pair address is not initialized yet.".into(),
					));
				}
				let target = state.target_leg();
				let amount = target
					.amount
					.filter(|amount| *amount > Decimal::ZERO)
					.ok_or_else(|| {
						OrderInputError::Precondition(
							"No amount specified when fetching quote.".into(),
						)
					})?;

				let request = QuoteRequest {
					pair_address: context.pair.address.clone(),
					order_type: state.order_type(),
					side: state.side,
					token_address: target.address.clone(),
					amount,
					platform_fee: self.exchange.platform_fee,
					constraint: match state.tab {
						OrderTab::Limit => PriceConstraint::Price(state.price),
						OrderTab::Market => PriceConstraint::Slippage(state.slippage),
					},
				};
				Ok((state.next_quote_ticket(), request))
			})
			.await?;

		let generation = ticket.generation();
		tracing::debug!(
			generation,
			side = %request.side,
			order_type = %request.order_type,
			amount = %request.amount,
			"Quote requested"
		);

		match self.pricing.quote(&request).await {
			Ok(quote) => {
				let applied = self
					.store
					.update_with(|state| {
						state.apply_quote(ticket, &quote, &self.exchange.liquidity_message_prefix)
					})
					.await;
				if !applied {
					return Ok(self.discard(generation));
				}

				tracing::debug!(
					generation,
					from_amount = %quote.from_amount,
					to_amount = %quote.to_amount,
					"Quote applied"
				);
				self.event_bus
					.publish(SessionEvent::Quote(QuoteEvent::Applied {
						generation,
						quote: quote.clone(),
					}))
					.ok();
				Ok(QuoteOutcome::Applied(quote))
			},
			Err(e) => {
				tracing::error!(generation, error = %e, "Could not get quote");
				let applied = self
					.store
					.update_with(|state| state.apply_quote_failure(ticket))
					.await;
				if !applied {
					return Ok(self.discard(generation));
				}

				self.event_bus
					.publish(SessionEvent::Quote(QuoteEvent::Failed {
						generation,
						error: e.to_string(),
					}))
					.ok();
				Ok(QuoteOutcome::Failed(e.to_string()))
			},
		}
	}

	fn discard(&self, generation: u64) -> QuoteOutcome {
		tracing::debug!(generation, "Discarding outdated quote response");
		self.event_bus
			.publish(SessionEvent::Quote(QuoteEvent::Discarded { generation }))
			.ok();
		QuoteOutcome::Discarded
	}
}
