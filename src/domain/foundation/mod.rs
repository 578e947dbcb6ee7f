//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, and error codes
//! that form the vocabulary of the name registry domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{ErrorCode, StoreError};
pub use ids::{ApplicationId, OwnerId};
pub use timestamp::Timestamp;
