//! The handler registry adapter (C3): per-transaction-type business rules.

use std::fmt;
use std::sync::Arc;

use chain_error::Error as InnerError;

use crate::error::Reject;
use crate::pool::Pool;
use crate::types::{DecodedTransaction, Transaction, TransactionId};

/// Raised by [`HandlerRegistry::get`] when no handler is registered for a
/// transaction's `(kind, type_group)`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no handler registered for type '{0}'")]
pub struct InvalidTransactionType(pub String);

/// §4.3's final clause: resolution either raises `InvalidTransactionType`
/// (mapped to `ERR_UNSUPPORTED`) or any other error (normalised to
/// `ERR_UNKNOWN` with the underlying message attached verbatim).
#[derive(Debug, Clone, thiserror::Error)]
pub enum HandlerResolutionError {
    #[error(transparent)]
    Unsupported(#[from] InvalidTransactionType),
    #[error(transparent)]
    Other(InnerError),
}

/// A read-only view of wallet state, as seen by [`Handler::verify`].
///
/// The distilled spec leaves `poolWallets` opaque; this crate only needs
/// enough to let a reference handler check nonce ordering, the one piece of
/// wallet state every transaction-type handler in practice consults.
pub trait WalletState: Send + Sync {
    /// The next nonce the pool expects from this sender, if known.
    fn expected_nonce(&self, sender_public_key: &str) -> Option<u64>;
}

/// A capability that lets a handler record a rejection against the
/// transaction currently under the semantic gate, without exposing the rest
/// of the processor (§9 "back-references to self").
pub trait ErrorSink {
    fn push_error(&mut self, id: &TransactionId, reject: Reject);
}

/// A per-type business-rule validator.
pub trait Handler: Send + Sync {
    /// The dispatch key this handler answers for, e.g. `"transfer"`.
    fn name(&self) -> &str;

    /// §4.3 type-support check, final clause: may itself call `push_error`
    /// on `errors` and return `false` instead of returning a `Reject`
    /// through the gate's own error path.
    fn can_enter_transaction_pool(
        &self,
        tx: &Transaction,
        pool: &dyn Pool,
        errors: &mut dyn ErrorSink,
    ) -> bool;

    /// §4.2 step 6: full verification of a decoded transaction, including
    /// cryptographic signature checking (delegated to a
    /// [`crate::signature::SignatureVerifier`] the handler holds).
    fn verify(&self, tx: &DecodedTransaction, wallets: &dyn WalletState) -> bool;
}

impl fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name()).finish()
    }
}

/// Resolves a [`Transaction`] to the [`Handler`] responsible for its type.
pub trait HandlerRegistry: Send + Sync {
    /// §6 `HandlerRegistry.get(tx) -> Handler` (may raise
    /// `InvalidTransactionType`, or any other error).
    fn get(&self, tx: &Transaction) -> Result<Arc<dyn Handler>, HandlerResolutionError>;
}
