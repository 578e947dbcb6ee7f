//! Name registry domain.
//!
//! Records for registered names and pending applications, the name pattern,
//! and the error taxonomy shared by the registry, the queue, and the
//! workflows built on them.

mod errors;
mod name;
mod records;

pub use errors::{ApplicationLookup, RegistryError};
pub use name::{check_name_valid, is_name_char, MAX_NAME_CHARS, MIN_NAME_CHARS};
pub use records::{ApplicationRecord, NameRecord, NewApplication, UpsertOutcome};
