//! Domain layer containing business rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, error codes)
//! - `naming` - Name pattern, records, and the registry error taxonomy

pub mod foundation;
pub mod naming;
