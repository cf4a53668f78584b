//! Common types module for the order input system.
//!
//! This module defines the data model shared by every crate of the workspace:
//! the two token legs of an order, the trading context read from the pair and
//! order book, and the wire contracts exchanged with the pricing engine and the
//! wallet signer.

/// Event types published by the order engine.
pub mod events;
/// Trading pair, token identity and session context types.
pub mod market;
/// Order input types: tabs, sides, order types and token legs.
pub mod order;
/// Quote request and response types for the pricing engine contract.
pub mod quote;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Transaction request, manifest and outcome types for the signer contract.
pub mod transaction;
/// Utility functions for decimal handling and display formatting.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use events::*;
pub use market::*;
pub use order::*;
pub use quote::*;
pub use registry::ImplementationRegistry;
pub use transaction::*;
pub use utils::{decimal_places, display_amount, truncate_id};
pub use validation::*;

/// Re-export of the decimal type used for every amount, price and fraction.
pub use rust_decimal::Decimal;
