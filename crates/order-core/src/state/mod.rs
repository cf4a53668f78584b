//! State management for the order being constructed.
//!
//! This module provides the order input aggregate with its synchronous mutation
//! handlers, and the shared store the asynchronous workflows update it through.

pub mod order_input;
pub mod store;

pub use order_input::{
	OrderInputState, QuoteTicket, QUOTE_FAILURE_MESSAGE, RESTING_ORDER_DESCRIPTION,
};
pub use store::OrderInputStore;
