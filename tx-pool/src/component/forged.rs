//! The forged-history reconciler (C6): §4.6.

use std::collections::{HashMap, HashSet};

use crate::error::{Reject, RejectEntry};
use crate::forged::TransactionRepository;
use crate::types::{Transaction, TransactionId};

/// Drops ids already present on chain from `accept`/`broadcast` and records
/// an `ERR_FORGED` entry for each.
///
/// Runs after every per-transaction gate and before pool insertion, so an
/// already-forged transaction never reaches `Pool::add_transactions`.
pub async fn reconcile(
    repository: &dyn TransactionRepository,
    accept_ids: &mut HashSet<TransactionId>,
    broadcast_ids: &mut HashSet<TransactionId>,
    accept_data: &HashMap<TransactionId, Transaction>,
    errors: &mut HashMap<TransactionId, Vec<RejectEntry>>,
    invalid_ids: &mut HashSet<TransactionId>,
) {
    let candidates: Vec<TransactionId> = accept_ids.union(broadcast_ids).cloned().collect();
    if candidates.is_empty() {
        return;
    }

    let forged = repository.get_forged_transaction_ids(&candidates).await;
    for id in forged {
        assert!(
            accept_data.contains_key(&id) || broadcast_ids.contains(&id),
            "forged reconciliation: id {id} was not a survivor of the per-transaction gates",
        );
        accept_ids.remove(&id);
        broadcast_ids.remove(&id);
        errors.entry(id.clone()).or_default().push(RejectEntry::from(&Reject::Forged));
        invalid_ids.insert(id);
    }
}
