//! The flat, stable rejection taxonomy exposed to callers of `validate`.
//!
//! Every variant corresponds 1:1 to one `ERR_*` string in the external
//! contract; the string form is what actually crosses the wire, as a
//! [`RejectEntry`] inside `Report::errors`, so adding a variant here
//! without adding its string below is a bug, not a style choice.

use chain_error::Error as InnerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a transaction was rejected, or why it could not be classified.
///
/// `Reject` never aborts a batch: it is attached to a single transaction id
/// and accumulated into `Report::errors`, per the "accumulated, not raised"
/// policy.
#[derive(Error, Debug, Clone)]
pub enum Reject {
    /// The transaction id was already seen, either already cached this batch
    /// or already present in the pool. The payload is already the complete
    /// message (`"Already in cache."` or `"Duplicate transaction {id}"` per
    /// spec.md:65/79) — do not wrap it in further fixed text.
    #[error("{0}")]
    Duplicate(String),

    /// The transaction's canonical size exceeds the configured ceiling.
    #[error("Transaction size exceeds limit")]
    TooLarge,

    /// `timestamp` is further in the future than the allowed clock skew.
    #[error("Transaction {id} is {delta} seconds in the future")]
    FromFuture { id: String, delta: u32 },

    /// The transaction's expiration height has already passed.
    #[error("Transaction {id} is expired since {blocks} blocks.")]
    Expired { id: String, blocks: u32 },

    /// `network` does not match the active network's `pubKeyHash`.
    #[error("Transaction network mismatch")]
    WrongNetwork,

    /// No handler is registered for the transaction's type.
    #[error("Invalidating transaction of unsupported type '{0}'")]
    Unsupported(String),

    /// Schema validation failed while decoding the wire payload.
    #[error("Transaction failed schema validation")]
    TransactionSchema,

    /// The handler rejected the transaction during verification.
    #[error("Transaction didn't pass the verification process.")]
    BadData,

    /// The fee classifier assigned neither `enterPool` nor `broadcast`.
    #[error("The fee is too low to broadcast and accept the transaction")]
    LowFee,

    /// The fee classifier itself failed.
    #[error("Fee classification failed")]
    Apply,

    /// The transaction is already present in the forged-history index.
    #[error("Already forged.")]
    Forged,

    /// The pool reported the sender's transaction quota as full at insert
    /// time. Unlike every other pool-insertion failure this does not revoke
    /// broadcast eligibility (see `component::insertion`).
    #[error("Pool is full")]
    PoolFull,

    /// Any other collaborator failure, normalised with its message attached
    /// verbatim, per the "unrecognised exceptions" clause.
    #[error("{0}")]
    Unknown(InnerError),
}

impl Reject {
    /// The stable `ERR_*` string that is part of the external contract.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Reject::Duplicate(_) => "ERR_DUPLICATE",
            Reject::TooLarge => "ERR_TOO_LARGE",
            Reject::FromFuture { .. } => "ERR_FROM_FUTURE",
            Reject::Expired { .. } => "ERR_EXPIRED",
            Reject::WrongNetwork => "ERR_WRONG_NETWORK",
            Reject::Unsupported(_) => "ERR_UNSUPPORTED",
            Reject::TransactionSchema => "ERR_TRANSACTION_SCHEMA",
            Reject::BadData => "ERR_BAD_DATA",
            Reject::LowFee => "ERR_LOW_FEE",
            Reject::Apply => "ERR_APPLY",
            Reject::Forged => "ERR_FORGED",
            Reject::PoolFull => "ERR_POOL_FULL",
            Reject::Unknown(_) => "ERR_UNKNOWN",
        }
    }

    /// `true` for [`Reject::PoolFull`], the single rejection kind that
    /// leaves broadcast eligibility untouched (§4.7).
    pub fn keeps_broadcast(&self) -> bool {
        matches!(self, Reject::PoolFull)
    }
}

/// One `{type, message}` entry as it is recorded in `Report::errors`.
///
/// A transaction id may accumulate more than one entry only through
/// pool-insertion reconciliation running after an already-recorded gate
/// failure is impossible by construction (gates are terminal); in practice
/// each id carries at most one entry, but the wire shape is a list to match
/// the external contract verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl From<&Reject> for RejectEntry {
    fn from(reject: &Reject) -> Self {
        RejectEntry {
            kind: reject.kind_str().to_owned(),
            message: reject.to_string(),
        }
    }
}

impl fmt::Display for RejectEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
