//! Row-count checks shared by the registry and the queue.

use crate::domain::foundation::StoreError;
use crate::domain::naming::RegistryError;

/// Reduces the rows matched by a unique key to at most one.
///
/// More than one row means the uniqueness invariant was broken.
pub(crate) fn at_most_one<T>(mut rows: Vec<T>, key: &str) -> Result<Option<T>, RegistryError> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        n => Err(RegistryError::inconsistency(format!(
            "{} rows matched unique key {}",
            n, key
        ))),
    }
}

/// Requires a write to have affected exactly one row.
pub(crate) fn expect_one_affected(count: u64, operation: &str) -> Result<(), RegistryError> {
    if count == 1 {
        Ok(())
    } else {
        Err(RegistryError::inconsistency(format!(
            "{} affected {} rows, expected 1",
            operation, count
        )))
    }
}

/// Maps an insert failure, treating the unique backstop firing as a logic
/// defect rather than a store fault.
///
/// The checks run under the session lock, so the constraint can only fire
/// if a row escaped them.
pub(crate) fn insert_error(err: StoreError) -> RegistryError {
    match err {
        StoreError::UniqueViolation { constraint } => RegistryError::inconsistency(format!(
            "unique constraint {} fired after checks passed",
            constraint
        )),
        other => other.into(),
    }
}
