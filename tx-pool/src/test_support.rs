//! In-memory reference collaborators used to exercise the pipeline in tests
//! without a real database, network or cryptographic backend.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::Reject;
use crate::fee::FeeClassification;
use crate::forged::TransactionRepository;
use crate::handler::{
    ErrorSink, Handler, HandlerRegistry, HandlerResolutionError, InvalidTransactionType, WalletState,
};
use crate::pool::{NotAdded, Pool};
use crate::state_store::{CacheOutcome, StateStore};
use crate::types::{DecodedTransaction, Transaction, TransactionId};

/// A pool that never rejects anything unless explicitly configured to.
#[derive(Default)]
pub struct InMemoryPool {
    members: Mutex<HashSet<TransactionId>>,
    quota_exceeded: Mutex<HashSet<String>>,
    reject_on_insert: Mutex<HashMap<TransactionId, (Reject, String)>>,
    inserted: Mutex<Vec<TransactionId>>,
}

impl InMemoryPool {
    pub fn mark_quota_exceeded(&self, sender_public_key: &str) {
        self.quota_exceeded.lock().unwrap().insert(sender_public_key.to_owned());
    }

    /// Configures the next `add_transactions` call to refuse `id` with
    /// `reject`, reporting `message` as the pool-supplied detail — distinct
    /// from `reject`'s own generic `Display` text, mirroring a real pool
    /// that reports e.g. "sender quota exceeded at insert time".
    pub fn reject_on_insert_with_message(&self, id: TransactionId, reject: Reject, message: impl Into<String>) {
        self.reject_on_insert.lock().unwrap().insert(id, (reject, message.into()));
    }

    pub fn reject_on_insert(&self, id: TransactionId, reject: Reject) {
        let message = reject.to_string();
        self.reject_on_insert.lock().unwrap().insert(id, (reject, message));
    }

    pub fn inserted(&self) -> Vec<TransactionId> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Pool for InMemoryPool {
    async fn has(&self, id: &TransactionId) -> bool {
        self.members.lock().unwrap().contains(id)
    }

    async fn has_exceeded_max_transactions(&self, sender_public_key: &str) -> bool {
        self.quota_exceeded.lock().unwrap().contains(sender_public_key)
    }

    async fn add_transactions(&self, transactions: &[Transaction]) -> Vec<NotAdded> {
        let mut not_added = Vec::new();
        let mut rejects = self.reject_on_insert.lock().unwrap();
        let mut members = self.members.lock().unwrap();
        let mut inserted = self.inserted.lock().unwrap();
        for tx in transactions {
            if let Some((reject, message)) = rejects.remove(&tx.id) {
                not_added.push(NotAdded {
                    id: tx.id.clone(),
                    reject,
                    message,
                });
            } else {
                members.insert(tx.id.clone());
                inserted.push(tx.id.clone());
            }
        }
        not_added
    }

    fn wallets(&self) -> &dyn WalletState {
        self
    }
}

impl WalletState for InMemoryPool {
    fn expected_nonce(&self, _sender_public_key: &str) -> Option<u64> {
        None
    }
}

/// Bounds how many fingerprints the reference cache remembers (C1: "reject
/// transactions already seen this epoch"). Production-sized pools cap this
/// instead of growing it unboundedly across a long-lived node.
const FINGERPRINT_CACHE_CAPACITY: usize = 100_000;

/// A state store that caches whatever it is given and never reports a
/// duplicate unless the same id was cached in an earlier call.
pub struct InMemoryStateStore {
    cached: Mutex<lru::LruCache<TransactionId, ()>>,
    last_height: Mutex<u32>,
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        InMemoryStateStore::with_height(0)
    }
}

impl InMemoryStateStore {
    pub fn with_height(height: u32) -> Self {
        InMemoryStateStore {
            cached: Mutex::new(lru::LruCache::new(FINGERPRINT_CACHE_CAPACITY)),
            last_height: Mutex::new(height),
        }
    }
}

#[async_trait::async_trait]
impl StateStore for InMemoryStateStore {
    async fn cache_transactions(&self, transactions: Vec<Transaction>) -> CacheOutcome {
        let mut cached = self.cached.lock().unwrap();
        let mut outcome = CacheOutcome::default();
        for tx in transactions {
            if cached.contains(&tx.id) {
                outcome.not_added.push(tx);
            } else {
                cached.put(tx.id.clone(), ());
                outcome.added.push(tx);
            }
        }
        outcome
    }

    async fn get_last_height(&self) -> u32 {
        *self.last_height.lock().unwrap()
    }
}

/// A forged-history index backed by a fixed set of already-forged ids.
#[derive(Default)]
pub struct InMemoryForgedIndex {
    forged: HashSet<TransactionId>,
}

impl InMemoryForgedIndex {
    pub fn with_forged(ids: impl IntoIterator<Item = TransactionId>) -> Self {
        InMemoryForgedIndex {
            forged: ids.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl TransactionRepository for InMemoryForgedIndex {
    async fn get_forged_transaction_ids(&self, ids: &[TransactionId]) -> Vec<TransactionId> {
        ids.iter().filter(|id| self.forged.contains(id)).cloned().collect()
    }
}

/// A handler that accepts every transaction of a given `kind`.
pub struct AcceptAllHandler {
    pub kind: String,
}

impl Handler for AcceptAllHandler {
    fn name(&self) -> &str {
        &self.kind
    }

    fn can_enter_transaction_pool(
        &self,
        _tx: &Transaction,
        _pool: &dyn Pool,
        _errors: &mut dyn ErrorSink,
    ) -> bool {
        true
    }

    fn verify(&self, _tx: &DecodedTransaction, _wallets: &dyn WalletState) -> bool {
        true
    }
}

/// A handler that always rejects in `can_enter_transaction_pool`, with or
/// without recording its own reason first — used to exercise both halves of
/// the §9 "back-references to self" contract: the cooperative case (the
/// handler calls `push_error`) and the uncooperative one (it doesn't,
/// relying on the orchestrator's fallback).
pub struct RejectingHandler {
    pub kind: String,
    pub records_own_error: bool,
}

impl Handler for RejectingHandler {
    fn name(&self) -> &str {
        &self.kind
    }

    fn can_enter_transaction_pool(
        &self,
        tx: &Transaction,
        _pool: &dyn Pool,
        errors: &mut dyn ErrorSink,
    ) -> bool {
        if self.records_own_error {
            errors.push_error(&tx.id, Reject::BadData);
        }
        false
    }

    fn verify(&self, _tx: &DecodedTransaction, _wallets: &dyn WalletState) -> bool {
        true
    }
}

/// Resolves every transaction to an [`AcceptAllHandler`] keyed by `kind`,
/// unless the kind is in `unsupported` or `rejecting`.
#[derive(Default)]
pub struct StaticHandlerRegistry {
    pub unsupported: HashSet<String>,
    /// Kinds resolved to a [`RejectingHandler`], and whether that handler
    /// records its own error before returning `false`.
    pub rejecting: HashMap<String, bool>,
}

impl HandlerRegistry for StaticHandlerRegistry {
    fn get(&self, tx: &Transaction) -> Result<std::sync::Arc<dyn Handler>, HandlerResolutionError> {
        if self.unsupported.contains(&tx.kind) {
            return Err(InvalidTransactionType(tx.kind.clone()).into());
        }
        if let Some(&records_own_error) = self.rejecting.get(&tx.kind) {
            return Ok(std::sync::Arc::new(RejectingHandler {
                kind: tx.kind.clone(),
                records_own_error,
            }));
        }
        Ok(std::sync::Arc::new(AcceptAllHandler { kind: tx.kind.clone() }))
    }
}

/// A fee classifier whose outcome is fixed per call, for deterministic
/// scenario tests.
pub struct FixedFeeClassifier {
    pub classification: FeeClassification,
}

impl crate::fee::FeeClassifier for FixedFeeClassifier {
    fn classify(&self, _tx: &DecodedTransaction) -> Result<FeeClassification, chain_error::Error> {
        Ok(self.classification)
    }
}

/// A fee classifier that always raises a fatal error, for exercising
/// `ERR_APPLY`.
#[derive(Default)]
pub struct FailingFeeClassifier;

impl crate::fee::FeeClassifier for FailingFeeClassifier {
    fn classify(&self, _tx: &DecodedTransaction) -> Result<FeeClassification, chain_error::Error> {
        Err(chain_error::ErrorKind::Pool.other("fee milestone lookup failed"))
    }
}

/// A milestone/network configuration that never changes across a batch.
pub struct StaticConfigManager {
    pub block_time: u32,
    pub network_pubkey_hash: u8,
}

impl crate::consensus::ConfigManager for StaticConfigManager {
    fn get_milestone(&self, _height: u32) -> crate::consensus::Milestone {
        crate::consensus::Milestone {
            block_time: self.block_time,
        }
    }

    fn network_pubkey_hash(&self) -> u8 {
        self.network_pubkey_hash
    }
}

/// A slot clock pinned to a fixed second, independent of the faketime guard
/// so tests can set the two clocks (wall clock vs. "chain time") separately
/// when they need to.
pub struct FixedSlots {
    pub now: u32,
}

impl crate::state_store::Slots for FixedSlots {
    fn get_time(&self) -> u32 {
        self.now
    }
}

pub fn sample_transaction(id: &str, kind: &str, fee: u64, timestamp: u32) -> Transaction {
    Transaction {
        id: TransactionId::from(id),
        sender_public_key: format!("pubkey-{id}"),
        kind: kind.to_owned(),
        type_group: 1,
        network: None,
        timestamp,
        fee,
        nonce: None,
        serialized_bytes: vec![1, 2, 3],
    }
}
