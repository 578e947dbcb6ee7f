//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the registry to external systems:
//! - `postgres` - Store ports over a single PostgreSQL connection
//! - `memory` - In-memory store and currency ledger for development and tests

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryConnectionSource, InMemoryCurrencyGateway, LedgerEntry, StoreStats};
pub use postgres::{PostgresApplicationTable, PostgresConnectionSource, PostgresNameTable};
