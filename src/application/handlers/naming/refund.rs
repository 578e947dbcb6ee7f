//! Refund with restore-on-failure, shared by reject and cancel.

use tracing::{error, warn};

use crate::application::ApplicationQueue;
use crate::domain::naming::{ApplicationRecord, RegistryError};
use crate::ports::CurrencyGateway;

/// Returns the application's reserved coins to its owner.
///
/// Returns the owner's new balance, or `None` when nothing was reserved.
/// If the refund fails the application is put back (under a new id) so the
/// owner keeps a claim on the coins, and the refund error is returned.
pub(super) async fn refund_or_restore(
    queue: &ApplicationQueue,
    currency: &dyn CurrencyGateway,
    application: &ApplicationRecord,
    memo: &str,
) -> Result<Option<i64>, RegistryError> {
    if application.reserved_coins <= 0 {
        return Ok(None);
    }

    let refund = currency
        .add_back(application.owner, application.reserved_coins, memo)
        .await;
    let original = match refund {
        Ok(balance) => return Ok(Some(balance)),
        Err(e) => RegistryError::from(e),
    };

    warn!(
        id = %application.id,
        owner = %application.owner,
        error = %original,
        "refund failed, restoring application"
    );
    match queue.add_no_check(&application.to_new()).await {
        Ok(restored) => {
            warn!(id = %application.id, restored_id = %restored, "application restored after failed refund");
            Err(original)
        }
        Err(compensation) => {
            error!(
                id = %application.id,
                owner = %application.owner,
                coins = application.reserved_coins,
                error = %compensation,
                "failed to restore application after failed refund"
            );
            Err(RegistryError::compensation(original, compensation))
        }
    }
}
