//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `ConnectionSource` - Hands out the live connection, replaces broken ones
//! - `StoreConnection` - Opens the managed tables on one connection
//! - `NameTable` - Row access to registered names
//! - `ApplicationTable` - Row access to pending applications
//!
//! ## External Collaborators
//!
//! - `CurrencyGateway` - Consume/refund against a ledger this core does not own

mod application_table;
mod currency_gateway;
mod name_table;
mod store;

pub use application_table::ApplicationTable;
pub use currency_gateway::{CurrencyError, CurrencyGateway};
pub use name_table::NameTable;
pub use store::{ConnectionEpoch, ConnectionSource, StoreConnection};
