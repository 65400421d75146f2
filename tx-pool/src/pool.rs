//! The `Pool` collaborator: the authoritative, persisted mempool.
//!
//! Out of scope per the purpose statement — membership, sender-quota
//! enforcement and bulk insert live behind this trait. The processor treats
//! every call as atomic and never assumes anything about how the pool
//! synchronises concurrent access from other subsystems.

use crate::error::Reject;
use crate::handler::WalletState;
use crate::types::{Transaction, TransactionId};

/// One transaction the pool refused to store, as returned by
/// [`Pool::add_transactions`].
///
/// spec.md:130/176 models the pool's reply as `{transaction, type:
/// errorKind, message}` — `message` is pool-supplied, not derivable purely
/// from `reject`'s kind, so a real pool can report e.g. "sender quota
/// exceeded at insert time" instead of `reject`'s generic `Display` text.
#[derive(Debug, Clone)]
pub struct NotAdded {
    pub id: TransactionId,
    pub reject: Reject,
    pub message: String,
}

/// The persisted mempool, shared across batches.
///
/// Implementations are responsible for their own internal synchronisation;
/// the processor never mutates pool state directly, only through
/// `add_transactions`.
#[async_trait::async_trait]
pub trait Pool: Send + Sync {
    /// §6 `Pool.has(id)`.
    async fn has(&self, id: &TransactionId) -> bool;

    /// §6 `Pool.hasExceededMaxTransactions(pubkey)`.
    async fn has_exceeded_max_transactions(&self, sender_public_key: &str) -> bool;

    /// §6 `Pool.addTransactions(tx[])`.
    ///
    /// Every transaction not named in the returned list is taken to have
    /// been stored; the caller (C7) reconciles the difference.
    async fn add_transactions(&self, transactions: &[Transaction]) -> Vec<NotAdded>;

    /// The read-only wallet-state view `Handler::verify` consults (§4.4's
    /// `poolWallets`).
    fn wallets(&self) -> &dyn WalletState;
}
