//! The expiration calculator used by the semantic gate (§4.3).

use crate::types::Transaction;

/// The milestone-derived context an expiration calculator consults.
#[derive(Debug, Clone, Copy)]
pub struct ExpirationContext {
    /// Seconds per block under the active milestone.
    pub block_time: u32,
    pub current_height: u32,
    /// Seconds since the Unix epoch.
    pub now: u32,
    pub max_transaction_age: u32,
}

/// Computes an absolute block height after which a transaction expires, or
/// `None` meaning non-expiring.
pub trait ExpirationCalculator: Send + Sync {
    fn expiration_height(&self, tx: &Transaction, ctx: &ExpirationContext) -> Option<u32>;
}

/// The reference calculator: a transaction created `maxTransactionAge`
/// blocks ago (estimated from its own `timestamp` and `blockTime`) expires.
pub struct BlockAgeExpirationCalculator;

impl ExpirationCalculator for BlockAgeExpirationCalculator {
    fn expiration_height(&self, tx: &Transaction, ctx: &ExpirationContext) -> Option<u32> {
        if ctx.max_transaction_age == 0 || ctx.block_time == 0 {
            return None;
        }
        let age_seconds = ctx.now.saturating_sub(tx.timestamp);
        let age_blocks = age_seconds / ctx.block_time;
        let created_height = ctx.current_height.saturating_sub(age_blocks);
        Some(created_height + ctx.max_transaction_age)
    }
}
