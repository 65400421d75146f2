//! Configuration recognised by the admission processor.

use serde::{Deserialize, Serialize};

/// The subset of pool configuration the processor itself consults.
///
/// Sender-quota and pool-capacity accounting are the `Pool` collaborator's
/// own business; `PoolConfig` only carries the knobs §6 lists as read
/// directly by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    /// Documented for operators; not enforced by the processor itself — see
    /// `Pool::has_exceeded_max_transactions` and pool-insertion reconciliation
    /// for where capacity actually bites.
    pub max_tx_pool_size: u32,

    /// §6 `maxTransactionBytes`: the ceiling on a transaction's canonical
    /// encoded size (`Transaction::canonical_size`).
    pub max_tx_bytes: u32,

    /// §6 `maxTransactionAge`: the block-age horizon fed to the expiration
    /// calculator.
    pub max_tx_age: u32,

    /// Allowed clock skew, in seconds, for the future-timestamp gate (§4.3).
    /// The distilled spec pins this to 3600; exposed here so a deployment
    /// can tighten it without patching the gate.
    pub max_future_seconds: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_tx_pool_size: 30_000,
            max_tx_bytes: 10_000,
            max_tx_age: 2_700,
            max_future_seconds: 3_600,
        }
    }
}
