//! The `TransactionRepository` collaborator: the forged-history index.

use crate::types::TransactionId;

/// Historical ledger lookup: which of these ids are already on chain.
#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    /// §6 `TransactionRepository.getForgedTransactionsIds(ids)`.
    ///
    /// Returns the subset of `ids` that are already forged. Order is not
    /// significant; C6 only uses this as a membership test.
    async fn get_forged_transaction_ids(&self, ids: &[TransactionId]) -> Vec<TransactionId>;
}
