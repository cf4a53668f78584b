//! Utility functions for decimal handling and display formatting.

pub mod formatting;

pub use formatting::{decimal_places, display_amount, truncate_id};
