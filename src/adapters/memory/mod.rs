//! In-memory adapters for the store and currency ports.
//!
//! Suitable for development, demos, and tests. Nothing persists across
//! restarts.

mod currency;
mod store;

pub use currency::{InMemoryCurrencyGateway, LedgerEntry};
pub use store::{InMemoryConnectionSource, StoreStats};
