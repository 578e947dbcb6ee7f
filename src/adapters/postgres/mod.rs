//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresConnectionSource` - Single shared connection, replaced on failure
//! - `PostgresNameTable` - Accessor for `cjk_names`
//! - `PostgresApplicationTable` - Accessor for `cjk_name_applications`

mod application_table;
mod connection;
mod name_table;

pub use application_table::PostgresApplicationTable;
pub use connection::PostgresConnectionSource;
pub use name_table::PostgresNameTable;
