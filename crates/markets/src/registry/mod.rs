//! Dispatch from exchange names to adapters.

mod exchange_registry;

pub use exchange_registry::ExchangeRegistry;
