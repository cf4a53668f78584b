//! Order input state and its mutation handlers.
//!
//! Every handler is synchronous and total: it never fails and always leaves the
//! two legs mirroring the active pair. Quote responses are tied to the ticket
//! issued when their request was built; a response carrying an outdated ticket
//! leaves the state untouched.

use crate::validation::{check_funds, validate_amount, validate_leg1};
use order_types::{
	display_amount, LegId, OrderSide, OrderTab, OrderType, Quote, TokenInfo, TokenLeg,
	TradingContext, ValidationResult,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// Decimal places used when rendering quote amounts in the description.
const DESCRIPTION_DECIMALS: u32 = 8;

/// Message set on the target leg when the pricing engine fails.
pub const QUOTE_FAILURE_MESSAGE: &str = "Could not get quote";

/// Description used when a quote does not fill immediately.
pub const RESTING_ORDER_DESCRIPTION: &str = "Order will not immediately execute.";

/// Identifies one issued quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteTicket(u64);

impl QuoteTicket {
	pub fn generation(&self) -> u64 {
		self.0
	}
}

/// The order being constructed in a trading session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderInputState {
	pub leg1: TokenLeg,
	pub leg2: TokenLeg,
	pub tab: OrderTab,
	pub side: OrderSide,
	/// Limit price. Zero means no price was established yet.
	pub price: Decimal,
	/// Slippage fraction for market orders, at most 1.
	pub slippage: Decimal,
	/// Places limit orders as post-only.
	pub prevent_immediate_execution: bool,
	/// Last successfully applied quote.
	pub quote: Option<Quote>,
	/// Summary of the last applied quote.
	pub description: Option<String>,
	pub transaction_in_progress: bool,
	pub transaction_result: Option<String>,
	#[serde(skip)]
	quote_generation: u64,
}

impl Default for OrderInputState {
	fn default() -> Self {
		Self::new(Decimal::new(1, 2))
	}
}

impl OrderInputState {
	/// Creates the state of a fresh session: empty legs, market tab, buy side.
	pub fn new(default_slippage: Decimal) -> Self {
		Self {
			leg1: TokenLeg::empty(),
			leg2: TokenLeg::empty(),
			tab: OrderTab::Market,
			side: OrderSide::Buy,
			price: Decimal::ZERO,
			slippage: default_slippage.min(Decimal::ONE),
			prevent_immediate_execution: false,
			quote: None,
			description: None,
			transaction_in_progress: false,
			transaction_result: None,
			quote_generation: 0,
		}
	}

	pub fn leg(&self, id: LegId) -> &TokenLeg {
		match id {
			LegId::Leg1 => &self.leg1,
			LegId::Leg2 => &self.leg2,
		}
	}

	fn leg_mut(&mut self, id: LegId) -> &mut TokenLeg {
		match id {
			LegId::Leg1 => &mut self.leg1,
			LegId::Leg2 => &mut self.leg2,
		}
	}

	/// Leg whose amount the user enters: leg2 on BUY, leg1 on SELL.
	pub fn target_leg(&self) -> &TokenLeg {
		self.leg(LegId::target_for(self.side))
	}

	/// Leg whose amount is derived from a quote.
	pub fn computed_leg(&self) -> &TokenLeg {
		self.leg(LegId::target_for(self.side).other())
	}

	/// Wire order type derived from the tab and the post-only flag.
	pub fn order_type(&self) -> OrderType {
		OrderType::from_tab(self.tab, self.prevent_immediate_execution)
	}

	pub fn set_active_tab(&mut self, tab: OrderTab) {
		self.tab = tab;
	}

	/// Makes the legs mirror the pair of `context`.
	///
	/// A leg whose token differs from the pair token is replaced by a fresh leg,
	/// which also outdates every quote request in flight. A price that was never
	/// established is seeded from the best buy price.
	pub fn set_pair(&mut self, context: &TradingContext) {
		let mut replaced = false;
		for (id, token) in [
			(LegId::Leg1, &context.pair.token1),
			(LegId::Leg2, &context.pair.token2),
		] {
			if self.leg(id).address != token.address {
				*self.leg_mut(id) = TokenLeg::for_token(token);
				replaced = true;
			}
		}
		if replaced {
			self.quote_generation += 1;
		}

		if self.price.is_zero() {
			self.price = context.best_buy.unwrap_or(Decimal::ZERO);
		}
	}

	/// Attaches a wallet balance to the leg holding `token`.
	///
	/// The funds check of leg1 is re-run so its cached result never lags
	/// behind the balance. Unknown tokens are ignored.
	pub fn set_balance(&mut self, token: &TokenInfo, balance: Decimal, context: &TradingContext) {
		if self.leg1.address == token.address {
			self.leg1.balance = Some(balance);
			self.revalidate(LegId::Leg1, context);
		} else if self.leg2.address == token.address {
			self.leg2.balance = Some(balance);
		}
	}

	/// Sets the amount of a leg and re-validates it.
	///
	/// Clearing an amount also clears the other leg, which waits for a fresh quote.
	pub fn set_amount(&mut self, id: LegId, amount: Option<Decimal>, context: &TradingContext) {
		self.leg_mut(id).amount = amount;
		self.revalidate(id, context);
		if amount.is_none() {
			self.leg_mut(id.other()).amount = None;
		}
	}

	/// Exchanges the two legs, including their cached validation results.
	pub fn swap_legs(&mut self) {
		std::mem::swap(&mut self.leg1, &mut self.leg2);
	}

	pub fn set_side(&mut self, side: OrderSide) {
		self.side = side;
	}

	pub fn set_price(&mut self, price: Decimal) {
		self.price = price;
	}

	/// Stores the slippage, capping values above 1 at 1.
	pub fn set_slippage(&mut self, slippage: Decimal) {
		self.slippage = slippage.min(Decimal::ONE);
	}

	pub fn toggle_prevent_immediate_execution(&mut self) {
		self.prevent_immediate_execution = !self.prevent_immediate_execution;
	}

	/// Sets the limit price to the best price of the current side, or 0 for an empty book side.
	pub fn use_best_price(&mut self, context: &TradingContext) {
		let best = match self.side {
			OrderSide::Buy => context.best_buy,
			OrderSide::Sell => context.best_sell,
		};
		self.price = best.unwrap_or(Decimal::ZERO);
	}

	fn revalidate(&mut self, id: LegId, context: &TradingContext) {
		let max_decimals = context.pair.amount_max_decimals;
		let leg = self.leg_mut(id);
		let result = match id {
			LegId::Leg1 => validate_leg1(leg, max_decimals),
			LegId::Leg2 => validate_amount(leg.amount, max_decimals),
		};
		leg.valid = result.valid;
		leg.message = result.message;
	}

	/// Issues the ticket for a new quote request, outdating all earlier ones.
	pub fn next_quote_ticket(&mut self) -> QuoteTicket {
		self.quote_generation += 1;
		QuoteTicket(self.quote_generation)
	}

	/// Returns true when no newer quote request was issued after `ticket`.
	pub fn is_current(&self, ticket: QuoteTicket) -> bool {
		ticket.0 == self.quote_generation
	}

	/// Writes a quote response into the order. Returns false for outdated tickets.
	///
	/// Market orders take the counter amount from the quote; when the quote
	/// reports a liquidity shortfall the fillable target amount is written too and
	/// the engine message is attached to the target leg. Limit orders derive the
	/// counter amount from the entered amount and the limit price.
	pub fn apply_quote(
		&mut self,
		ticket: QuoteTicket,
		quote: &Quote,
		liquidity_message_prefix: &str,
	) -> bool {
		if !self.is_current(ticket) {
			return false;
		}

		self.description = Some(describe(quote));
		self.quote = Some(quote.clone());

		let target = LegId::target_for(self.side);
		let computed = target.other();
		match self.tab {
			OrderTab::Market => {
				let (computed_amount, target_amount) = match self.side {
					OrderSide::Sell => (quote.to_amount, quote.from_amount),
					OrderSide::Buy => (quote.from_amount, quote.to_amount),
				};
				self.settle_quoted_leg(computed, Some(computed_amount));
				if quote.signals_insufficient_liquidity(liquidity_message_prefix) {
					self.settle_quoted_leg(target, Some(target_amount));
					self.leg_mut(target).message = quote.message.clone();
				}
			},
			OrderTab::Limit => {
				let derived = match self.side {
					OrderSide::Sell => self
						.leg1
						.amount
						.and_then(|amount| amount.checked_mul(self.price)),
					OrderSide::Buy => self
						.leg2
						.amount
						.and_then(|amount| amount.checked_div(self.price)),
				};
				self.settle_quoted_leg(computed, derived);
			},
		}
		true
	}

	/// Marks the target leg after a failed quote. Returns false for outdated tickets.
	pub fn apply_quote_failure(&mut self, ticket: QuoteTicket) -> bool {
		if !self.is_current(ticket) {
			return false;
		}

		let target = self.leg_mut(LegId::target_for(self.side));
		target.amount = None;
		target.valid = false;
		target.message = QUOTE_FAILURE_MESSAGE.to_string();
		true
	}

	/// Writes a quote-derived amount.
	///
	/// Derived amounts are not held to the entry precision; leg1 still has to be
	/// covered by the balance.
	fn settle_quoted_leg(&mut self, id: LegId, amount: Option<Decimal>) {
		let leg = self.leg_mut(id);
		leg.amount = amount;
		let result = match id {
			LegId::Leg1 => check_funds(leg),
			LegId::Leg2 => ValidationResult::ok(),
		};
		leg.valid = result.valid;
		leg.message = result.message;
	}

	/// Enters the in-progress phase of a submission.
	pub fn begin_transaction(&mut self) {
		self.transaction_in_progress = true;
		self.transaction_result = None;
	}

	/// Leaves the in-progress phase with the outcome message.
	pub fn finish_transaction(&mut self, message: impl Into<String>) {
		self.transaction_in_progress = false;
		self.transaction_result = Some(message.into());
	}
}

fn describe(quote: &Quote) -> String {
	if quote.from_amount > Decimal::ZERO && quote.to_amount > Decimal::ZERO {
		format!(
			"Sending {} {} to receive {} {}.",
			display_amount(quote.from_amount, DESCRIPTION_DECIMALS),
			quote.from_token.symbol,
			display_amount(quote.to_amount, DESCRIPTION_DECIMALS),
			quote.to_token.symbol
		)
	} else {
		RESTING_ORDER_DESCRIPTION.to_string()
	}
}
