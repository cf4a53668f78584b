//! Registry trait for self-registering implementations.
//!
//! Pricing engines and signers each expose a `Registry` struct implementing
//! this trait so the engine builder can find them by their configuration name.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This matches the key of the implementation table, for example
	/// "mock" for `pricing.implementations.mock`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
