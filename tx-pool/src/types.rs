//! The data model flowing through the admission pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RejectEntry;
use crate::handler::Handler;

/// The content-hash id of a transaction, as a hex string.
///
/// Uniqueness of an id is assumed by the processor and enforced by the
/// [`crate::state_store::StateStore`] cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        TransactionId(s.to_owned())
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        TransactionId(s)
    }
}

/// The opaque, wire-shaped transaction as it arrives at the ingress boundary.
///
/// This is the input form described by the data model: enough fields for the
/// structural and temporal gates to run without needing the fully decoded,
/// handler-specific representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    pub sender_public_key: String,
    /// The handler-dispatch type name, e.g. `"transfer"`.
    pub kind: String,
    pub type_group: u32,
    /// The network's `pubKeyHash`, when the transaction carries one.
    pub network: Option<u8>,
    /// Unix seconds.
    pub timestamp: u32,
    pub fee: u64,
    pub nonce: Option<u64>,
    pub serialized_bytes: Vec<u8>,
}

impl Transaction {
    /// The canonical byte size used to enforce `max_tx_bytes`.
    ///
    /// Measures the length of the transaction's canonical wire encoding
    /// directly, rather than the textual-JSON-length quirk of the system
    /// this pipeline was modeled on (see `DESIGN.md`'s design-notes entry).
    pub fn canonical_size(&self) -> usize {
        self.serialized_bytes.len()
    }
}

/// A transaction after schema validation, paired with the handler that will
/// perform semantic checks, verification and fee classification for it.
#[derive(Clone)]
pub struct DecodedTransaction {
    pub data: Transaction,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for DecodedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedTransaction")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// The aggregate outcome of one `validate` call.
///
/// `accept`, `broadcast` and `excess` preserve the input order of the batch
/// (property 5); `errors` is omitted from the JSON encoding when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub accept: Vec<TransactionId>,
    pub broadcast: Vec<TransactionId>,
    pub invalid: Vec<TransactionId>,
    pub excess: Vec<TransactionId>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub errors: HashMap<TransactionId, Vec<RejectEntry>>,
}

impl Report {
    /// `true` when every id accounted for is free of errors.
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty() && self.errors.is_empty()
    }
}
