//! The pool insertion reconciler (C7): §4.7.

use std::collections::{HashMap, HashSet};

use crate::error::RejectEntry;
use crate::pool::Pool;
use crate::types::{Transaction, TransactionId};

/// Submits `accept` to `Pool::add_transactions` in one call and reconciles
/// whatever the pool refused.
///
/// A pool-full rejection (`ERR_POOL_FULL`) is the one outcome that leaves
/// broadcast eligibility untouched; every other rejection means the
/// transaction is unfit and must not be gossiped either.
pub async fn reconcile(
    pool: &dyn Pool,
    accept_ids: &mut HashSet<TransactionId>,
    broadcast_ids: &mut HashSet<TransactionId>,
    accept_data: &HashMap<TransactionId, Transaction>,
    errors: &mut HashMap<TransactionId, Vec<RejectEntry>>,
    invalid_ids: &mut HashSet<TransactionId>,
) {
    if accept_ids.is_empty() {
        return;
    }

    let transactions: Vec<Transaction> = accept_ids
        .iter()
        .filter_map(|id| accept_data.get(id).cloned())
        .collect();

    let not_added = pool.add_transactions(&transactions).await;
    for item in not_added {
        accept_ids.remove(&item.id);
        if !item.reject.keeps_broadcast() {
            broadcast_ids.remove(&item.id);
        }
        errors.entry(item.id.clone()).or_default().push(RejectEntry {
            kind: item.reject.kind_str().to_owned(),
            message: item.message,
        });
        invalid_ids.insert(item.id);
    }
}
