//! The `StateStore` collaborator: chain height and the fingerprint cache.

use crate::types::Transaction;

/// The result of caching one batch, as returned by
/// [`StateStore::cache_transactions`].
///
/// `added` becomes the working set for the rest of the pipeline; every
/// transaction in `not_added` is rejected with `ERR_DUPLICATE` unless it
/// already carries an earlier error (§4.1 step 1, and the open question in
/// §9 on duplicate-error suppression, which this crate mirrors rather than
/// resolves).
#[derive(Debug, Clone, Default)]
pub struct CacheOutcome {
    pub added: Vec<Transaction>,
    pub not_added: Vec<Transaction>,
}

/// Chain height, the fingerprint cache, and (via [`Slots`]) the slot clock.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// §6 `StateStore.cacheTransactions(tx[])`.
    async fn cache_transactions(&self, transactions: Vec<Transaction>) -> CacheOutcome;

    /// §6 `StateStore.getLastHeight()`.
    async fn get_last_height(&self) -> u32;
}

/// §6 `Slots.getTime() -> u32`, the node's view of the current second.
///
/// Kept distinct from [`StateStore`] as in the collaborator list, since an
/// implementation is free to back it with a different clock source than
/// chain height.
pub trait Slots: Send + Sync {
    fn get_time(&self) -> u32;
}

/// A [`Slots`] backed by the node's real wall clock.
///
/// Goes through [`chain_systemtime::unix_time_as_millis`] rather than
/// `SystemTime::now()` directly, so a binary built with that crate's
/// `enable_faketime` feature can still pin "now" for an integration test
/// that exercises the future-timestamp and expiration gates deterministically
/// (§8 property 3).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClockSlots;

impl Slots for SystemClockSlots {
    fn get_time(&self) -> u32 {
        (chain_systemtime::unix_time_as_millis() / 1_000) as u32
    }
}
