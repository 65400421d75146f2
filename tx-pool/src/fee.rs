//! The dynamic-fee classifier (C5): §4.5.

use chain_error::Error as InnerError;

use crate::types::DecodedTransaction;

/// The outcome of classifying a transaction's fee against current milestone
/// conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeClassification {
    pub enter_pool: bool,
    pub broadcast: bool,
}

impl FeeClassification {
    /// `{false, false}`: neither accept nor broadcast. Maps to `ERR_LOW_FEE`.
    pub fn is_low_fee(&self) -> bool {
        !self.enter_pool && !self.broadcast
    }
}

/// A pure function of a decoded transaction and current milestone state.
///
/// The processor treats fee-market pricing itself as out of scope (§1
/// non-goals); it only consumes the two booleans this trait produces.
/// Failure is fatal to the single transaction being classified (§4.2 step
/// 7: "on a fatal classifier error emit `ERR_APPLY`"), not to the batch.
pub trait FeeClassifier: Send + Sync {
    fn classify(&self, tx: &DecodedTransaction) -> Result<FeeClassification, InnerError>;
}

/// A classifier gating purely on a flat minimum fee, useful for tests and as
/// a conservative default.
pub struct MinimumFeeClassifier {
    pub min_enter_fee: u64,
    pub min_broadcast_fee: u64,
}

impl FeeClassifier for MinimumFeeClassifier {
    fn classify(&self, tx: &DecodedTransaction) -> Result<FeeClassification, InnerError> {
        let fee = tx.data.fee;
        Ok(FeeClassification {
            enter_pool: fee >= self.min_enter_fee,
            broadcast: fee >= self.min_broadcast_fee,
        })
    }
}
