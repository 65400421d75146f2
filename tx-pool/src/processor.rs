//! The orchestrator (C9): `Processor::validate`, sequencing C1→C8.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, warn};

use crate::component::{forged, insertion, semantic_gate};
use crate::config::PoolConfig;
use crate::consensus::ConfigManager;
use crate::decode::{DecodeError, Decoder};
use crate::error::{Reject, RejectEntry};
use crate::fee::FeeClassifier;
use crate::forged::TransactionRepository;
use crate::handler::{ErrorSink, HandlerRegistry};
use crate::pool::Pool;
use crate::expiration::ExpirationCalculator;
use crate::state_store::{Slots, StateStore};
use crate::types::{DecodedTransaction, Report, Transaction, TransactionId};

/// Everything the processor borrows for the lifetime of one batch.
///
/// Constructed once per node and shared by reference, in place of the
/// container-injected fields the distilled spec's §9 redesign note calls
/// out: a `Processor` only ever borrows a `ProcessorDeps`, it does not own
/// or construct any of its collaborators.
pub struct ProcessorDeps {
    pub pool: Arc<dyn Pool>,
    pub state_store: Arc<dyn StateStore>,
    pub forged_index: Arc<dyn TransactionRepository>,
    pub handler_registry: Arc<dyn HandlerRegistry>,
    pub decoder: Arc<dyn Decoder>,
    pub fee_classifier: Arc<dyn FeeClassifier>,
    pub expiration_calculator: Arc<dyn ExpirationCalculator>,
    pub config_manager: Arc<dyn ConfigManager>,
    pub slots: Arc<dyn Slots>,
    pub config: PoolConfig,
}

/// A short-lived, single-use admission pipeline bound to one batch.
///
/// `validate` takes `self` by value so reuse is a compile error rather than
/// a runtime assertion — the cleanest way to express §3's "the processor is
/// single-use" invariant in Rust.
pub struct Processor<'a> {
    deps: &'a ProcessorDeps,
}

struct ErrorAccumulator<'a> {
    errors: &'a mut HashMap<TransactionId, Vec<RejectEntry>>,
    invalid_ids: &'a mut HashSet<TransactionId>,
}

impl ErrorSink for ErrorAccumulator<'_> {
    fn push_error(&mut self, id: &TransactionId, reject: Reject) {
        record(self.errors, self.invalid_ids, id.clone(), reject);
    }
}

fn record(
    errors: &mut HashMap<TransactionId, Vec<RejectEntry>>,
    invalid_ids: &mut HashSet<TransactionId>,
    id: TransactionId,
    reject: Reject,
) {
    errors.entry(id.clone()).or_default().push(RejectEntry::from(&reject));
    invalid_ids.insert(id);
}

impl<'a> Processor<'a> {
    pub fn new(deps: &'a ProcessorDeps) -> Self {
        Processor { deps }
    }

    /// §4.1: the fixed phase sequence. Each phase operates only on the
    /// survivors of the previous one.
    pub async fn validate(self, batch: Vec<Transaction>) -> Report {
        let input_order: Vec<TransactionId> = batch.iter().map(|t| t.id.clone()).collect();

        let mut errors: HashMap<TransactionId, Vec<RejectEntry>> = HashMap::new();
        let mut invalid_ids: HashSet<TransactionId> = HashSet::new();
        let mut excess_ids: HashSet<TransactionId> = HashSet::new();
        let mut accept_ids: HashSet<TransactionId> = HashSet::new();
        let mut broadcast_ids: HashSet<TransactionId> = HashSet::new();
        let mut accept_data: HashMap<TransactionId, Transaction> = HashMap::new();

        // Phase 1: cache (C1).
        let outcome = self.deps.state_store.cache_transactions(batch).await;
        for not_added in outcome.not_added {
            if !errors.contains_key(&not_added.id) {
                record(
                    &mut errors,
                    &mut invalid_ids,
                    not_added.id,
                    Reject::Duplicate("Already in cache.".to_owned()),
                );
            }
        }
        let working_set = outcome.added;

        // Phase 2-3: per-transaction filter (§4.2), only when there is
        // something left to examine.
        if !working_set.is_empty() {
            let now = self.deps.slots.get_time();
            let current_height = self.deps.state_store.get_last_height().await;
            let milestone = self.deps.config_manager.get_milestone(current_height);

            let gate_ctx = semantic_gate::GateContext {
                now,
                current_height,
                max_future_seconds: self.deps.config.max_future_seconds,
                max_transaction_age: self.deps.config.max_tx_age,
                milestone,
                network_pubkey_hash: self.deps.config_manager.network_pubkey_hash(),
                expiration_calculator: self.deps.expiration_calculator.as_ref(),
                handler_registry: self.deps.handler_registry.as_ref(),
            };

            for t in working_set {
                self.filter_one(
                    t,
                    &gate_ctx,
                    &mut errors,
                    &mut invalid_ids,
                    &mut excess_ids,
                    &mut accept_ids,
                    &mut broadcast_ids,
                    &mut accept_data,
                )
                .await;
            }
        }

        // Phase 4: forged reconciliation (C6).
        forged::reconcile(
            self.deps.forged_index.as_ref(),
            &mut accept_ids,
            &mut broadcast_ids,
            &accept_data,
            &mut errors,
            &mut invalid_ids,
        )
        .await;

        // Phase 5: pool insertion reconciliation (C7).
        insertion::reconcile(
            self.deps.pool.as_ref(),
            &mut accept_ids,
            &mut broadcast_ids,
            &accept_data,
            &mut errors,
            &mut invalid_ids,
        )
        .await;

        // Phase 6: stats (informational only).
        debug!(
            target: "tx_pool",
            "validate: accepted={} broadcast={} excess={} invalid={}",
            accept_ids.len(),
            broadcast_ids.len(),
            excess_ids.len(),
            invalid_ids.len(),
        );

        self.into_report(input_order, accept_ids, broadcast_ids, excess_ids, invalid_ids, errors)
    }

    #[allow(clippy::too_many_arguments)]
    async fn filter_one(
        &self,
        t: Transaction,
        gate_ctx: &semantic_gate::GateContext<'_>,
        errors: &mut HashMap<TransactionId, Vec<RejectEntry>>,
        invalid_ids: &mut HashSet<TransactionId>,
        excess_ids: &mut HashSet<TransactionId>,
        accept_ids: &mut HashSet<TransactionId>,
        broadcast_ids: &mut HashSet<TransactionId>,
        accept_data: &mut HashMap<TransactionId, Transaction>,
    ) {
        // 1. Existence.
        if self.deps.pool.has(&t.id).await {
            record(
                errors,
                invalid_ids,
                t.id.clone(),
                Reject::Duplicate(format!("Duplicate transaction {}", t.id)),
            );
            return;
        }

        // 2. Size.
        if t.canonical_size() as u32 > self.deps.config.max_tx_bytes {
            record(errors, invalid_ids, t.id.clone(), Reject::TooLarge);
            return;
        }

        // 3. Sender quota — excess, not an error.
        if self.deps.pool.has_exceeded_max_transactions(&t.sender_public_key).await {
            excess_ids.insert(t.id.clone());
            return;
        }

        // 4. Semantic gate.
        let handler = {
            let mut sink = ErrorAccumulator { errors, invalid_ids };
            match semantic_gate::check(&t, gate_ctx, self.deps.pool.as_ref(), &mut sink) {
                semantic_gate::GateOutcome::Pass(handler) => handler,
                semantic_gate::GateOutcome::Rejected(reject) => {
                    record(errors, invalid_ids, t.id.clone(), reject);
                    return;
                }
                semantic_gate::GateOutcome::RejectedByHandler => {
                    // The handler is trusted to have called `push_error` on
                    // the sink (handler.rs's `can_enter_transaction_pool`
                    // contract), but a handler is untrusted input from the
                    // orchestrator's point of view: if it returned `false`
                    // without recording a reason, fall back to a generic
                    // entry rather than leaving `invalid` with no matching
                    // `errors` entry (testable property 2).
                    if !errors.contains_key(&t.id) {
                        record(
                            errors,
                            invalid_ids,
                            t.id.clone(),
                            Reject::Unknown(
                                chain_error::ErrorKind::Transaction
                                    .other("handler rejected transaction without recording a reason"),
                            ),
                        );
                    } else {
                        invalid_ids.insert(t.id.clone());
                    }
                    return;
                }
            }
        };

        // 5. Decode.
        let decoded_data = match self.deps.decoder.decode(&t) {
            Ok(data) => data,
            Err(DecodeError::Schema(_)) => {
                record(errors, invalid_ids, t.id.clone(), Reject::TransactionSchema);
                return;
            }
            Err(DecodeError::Other(cause)) => {
                record(errors, invalid_ids, t.id.clone(), Reject::Unknown(cause));
                return;
            }
        };
        let decoded = DecodedTransaction {
            data: decoded_data,
            handler,
        };

        // 6. Handler verify.
        if !decoded.handler.verify(&decoded, self.deps.pool.wallets()) {
            record(errors, invalid_ids, t.id.clone(), Reject::BadData);
            return;
        }

        // 7. Fee classify.
        let classification = match self.deps.fee_classifier.classify(&decoded) {
            Ok(classification) => classification,
            Err(_cause) => {
                record(errors, invalid_ids, t.id.clone(), Reject::Apply);
                return;
            }
        };
        if classification.is_low_fee() {
            record(errors, invalid_ids, t.id.clone(), Reject::LowFee);
            return;
        }

        // 8. Insert into accept and/or broadcast.
        if classification.enter_pool {
            accept_ids.insert(t.id.clone());
            accept_data.insert(t.id.clone(), decoded.data.clone());
        }
        if classification.broadcast {
            broadcast_ids.insert(t.id.clone());
        }
    }

    /// C8: assemble the final `Report`, preserving input order (property 5)
    /// and deduplicating ids that appeared more than once in the batch.
    ///
    /// `invalid` is not exclusive of `broadcast`: a pool-full rejection at
    /// insertion time (§4.7) keeps its id in `broadcast` while also
    /// recording its `ERR_POOL_FULL` entry, so that id is invalid *and*
    /// still gossiped. See `DESIGN.md` for why this crate keeps that one
    /// documented exception rather than forcing the categories apart.
    fn into_report(
        &self,
        input_order: Vec<TransactionId>,
        accept_ids: HashSet<TransactionId>,
        broadcast_ids: HashSet<TransactionId>,
        excess_ids: HashSet<TransactionId>,
        invalid_ids: HashSet<TransactionId>,
        errors: HashMap<TransactionId, Vec<RejectEntry>>,
    ) -> Report {
        let mut seen = HashSet::new();
        let mut report = Report::default();

        for id in input_order {
            if !seen.insert(id.clone()) {
                continue;
            }

            let mut placed = false;
            if accept_ids.contains(&id) {
                report.accept.push(id.clone());
                placed = true;
            }
            if broadcast_ids.contains(&id) {
                report.broadcast.push(id.clone());
                placed = true;
            }
            if excess_ids.contains(&id) {
                report.excess.push(id.clone());
                placed = true;
            }
            if invalid_ids.contains(&id) {
                report.invalid.push(id.clone());
                placed = true;
            }
            if !placed {
                warn!(target: "tx_pool", "transaction {id} left the pipeline unclassified");
            }
        }

        report.errors = errors;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::SchemaDecoder;
    use crate::expiration::BlockAgeExpirationCalculator;
    use crate::fee::FeeClassification;
    use crate::test_support::{
        sample_transaction, FailingFeeClassifier, FixedFeeClassifier, FixedSlots, InMemoryForgedIndex,
        InMemoryPool, InMemoryStateStore, StaticConfigManager, StaticHandlerRegistry,
    };
    use std::collections::HashSet as StdHashSet;

    struct Harness {
        pool: Arc<InMemoryPool>,
        deps: ProcessorDeps,
    }

    fn harness(
        fee: FeeClassification,
        now: u32,
        unsupported_kinds: &[&str],
    ) -> Harness {
        let pool = Arc::new(InMemoryPool::default());
        processor_deps_from(pool, fee, now, unsupported_kinds, InMemoryForgedIndex::default())
    }

    fn processor_deps_from(
        pool: Arc<InMemoryPool>,
        fee: FeeClassification,
        now: u32,
        unsupported_kinds: &[&str],
        forged_index: InMemoryForgedIndex,
    ) -> Harness {
        let deps = ProcessorDeps {
            pool: pool.clone(),
            state_store: Arc::new(InMemoryStateStore::with_height(100)),
            forged_index: Arc::new(forged_index),
            handler_registry: Arc::new(StaticHandlerRegistry {
                unsupported: unsupported_kinds.iter().map(|s| s.to_string()).collect::<StdHashSet<_>>(),
                ..Default::default()
            }),
            decoder: Arc::new(SchemaDecoder),
            fee_classifier: Arc::new(FixedFeeClassifier { classification: fee }),
            expiration_calculator: Arc::new(BlockAgeExpirationCalculator),
            config_manager: Arc::new(StaticConfigManager {
                block_time: 10,
                network_pubkey_hash: 0x17,
            }),
            slots: Arc::new(FixedSlots { now }),
            config: PoolConfig::default(),
        };
        Harness { pool, deps }
    }

    fn accept_and_broadcast() -> FeeClassification {
        FeeClassification {
            enter_pool: true,
            broadcast: true,
        }
    }

    #[tokio::test]
    async fn s3_duplicate_in_batch_is_reported_once() {
        let h = harness(accept_and_broadcast(), 1_000, &["whatever"]);
        let tx = sample_transaction("tx_a", "whatever", 10_000, 1_000);
        let batch = vec![tx.clone(), tx];

        let report = Processor::new(&h.deps).validate(batch).await;

        assert_eq!(report.invalid, vec![TransactionId::from("tx_a")]);
        assert!(report.accept.is_empty());
        assert!(report.broadcast.is_empty());
        let entries = &report.errors[&TransactionId::from("tx_a")];
        assert_eq!(entries[0].kind, "ERR_DUPLICATE");
    }

    #[tokio::test]
    async fn s4_already_forged_is_dropped_from_accept_and_broadcast() {
        let forged = InMemoryForgedIndex::with_forged([TransactionId::from("tx_a")]);
        let pool = Arc::new(InMemoryPool::default());
        let h = processor_deps_from(pool, accept_and_broadcast(), 1_000, &[], forged);
        let tx = sample_transaction("tx_a", "transfer", 10_000, 1_000);

        let report = Processor::new(&h.deps).validate(vec![tx]).await;

        assert!(report.accept.is_empty());
        assert!(report.broadcast.is_empty());
        assert_eq!(report.errors[&TransactionId::from("tx_a")][0].kind, "ERR_FORGED");
        assert_eq!(report.invalid, vec![TransactionId::from("tx_a")]);
    }

    #[tokio::test]
    async fn s5_sender_quota_is_excess_not_error() {
        let h = harness(accept_and_broadcast(), 1_000, &[]);
        let tx = sample_transaction("tx_a", "transfer", 10_000, 1_000);
        h.pool.mark_quota_exceeded(&tx.sender_public_key);

        let report = Processor::new(&h.deps).validate(vec![tx.clone()]).await;

        assert_eq!(report.excess, vec![tx.id.clone()]);
        assert!(!report.errors.contains_key(&tx.id));
    }

    #[tokio::test]
    async fn s6_pool_full_on_insert_keeps_broadcast() {
        let h = harness(accept_and_broadcast(), 1_000, &[]);
        let tx = sample_transaction("tx_a", "transfer", 10_000, 1_000);
        h.pool.reject_on_insert(tx.id.clone(), Reject::PoolFull);

        let report = Processor::new(&h.deps).validate(vec![tx.clone()]).await;

        assert!(report.broadcast.contains(&tx.id));
        assert!(!report.accept.contains(&tx.id));
        assert_eq!(report.errors[&tx.id][0].kind, "ERR_POOL_FULL");
    }

    #[tokio::test]
    async fn s7_future_timestamp_is_rejected() {
        let h = harness(accept_and_broadcast(), 1_000, &[]);
        let tx = sample_transaction("tx_a", "transfer", 10_000, 1_000 + 3_601);

        let report = Processor::new(&h.deps).validate(vec![tx.clone()]).await;

        assert_eq!(report.errors[&tx.id][0].kind, "ERR_FROM_FUTURE");
    }

    #[tokio::test]
    async fn handler_rejection_with_its_own_error_satisfies_errors_iff_invalid() {
        let pool = Arc::new(InMemoryPool::default());
        let deps = ProcessorDeps {
            pool: pool.clone(),
            state_store: Arc::new(InMemoryStateStore::with_height(100)),
            forged_index: Arc::new(InMemoryForgedIndex::default()),
            handler_registry: Arc::new(StaticHandlerRegistry {
                rejecting: [("transfer".to_string(), true)].into_iter().collect(),
                ..Default::default()
            }),
            decoder: Arc::new(SchemaDecoder),
            fee_classifier: Arc::new(FixedFeeClassifier {
                classification: accept_and_broadcast(),
            }),
            expiration_calculator: Arc::new(BlockAgeExpirationCalculator),
            config_manager: Arc::new(StaticConfigManager {
                block_time: 10,
                network_pubkey_hash: 0x17,
            }),
            slots: Arc::new(FixedSlots { now: 1_000 }),
            config: PoolConfig::default(),
        };
        let tx = sample_transaction("tx_a", "transfer", 10_000, 1_000);

        let report = Processor::new(&deps).validate(vec![tx.clone()]).await;

        assert!(report.invalid.contains(&tx.id));
        assert_eq!(report.errors[&tx.id].len(), 1);
        assert_eq!(report.errors[&tx.id][0].kind, "ERR_BAD_DATA");
    }

    #[tokio::test]
    async fn handler_rejection_without_recording_a_reason_still_gets_an_error_entry() {
        let pool = Arc::new(InMemoryPool::default());
        let deps = ProcessorDeps {
            pool: pool.clone(),
            state_store: Arc::new(InMemoryStateStore::with_height(100)),
            forged_index: Arc::new(InMemoryForgedIndex::default()),
            handler_registry: Arc::new(StaticHandlerRegistry {
                rejecting: [("transfer".to_string(), false)].into_iter().collect(),
                ..Default::default()
            }),
            decoder: Arc::new(SchemaDecoder),
            fee_classifier: Arc::new(FixedFeeClassifier {
                classification: accept_and_broadcast(),
            }),
            expiration_calculator: Arc::new(BlockAgeExpirationCalculator),
            config_manager: Arc::new(StaticConfigManager {
                block_time: 10,
                network_pubkey_hash: 0x17,
            }),
            slots: Arc::new(FixedSlots { now: 1_000 }),
            config: PoolConfig::default(),
        };
        let tx = sample_transaction("tx_a", "transfer", 10_000, 1_000);

        let report = Processor::new(&deps).validate(vec![tx.clone()]).await;

        // Property 2, "errors-iff-invalid": a handler that returns `false`
        // without calling `push_error` must not leave `invalid` with no
        // matching `errors` entry.
        assert!(report.invalid.contains(&tx.id));
        assert_eq!(report.errors[&tx.id][0].kind, "ERR_UNKNOWN");
    }

    #[tokio::test]
    async fn fatal_fee_classifier_error_is_err_apply() {
        let pool = Arc::new(InMemoryPool::default());
        let deps = ProcessorDeps {
            pool: pool.clone(),
            state_store: Arc::new(InMemoryStateStore::with_height(100)),
            forged_index: Arc::new(InMemoryForgedIndex::default()),
            handler_registry: Arc::new(StaticHandlerRegistry::default()),
            decoder: Arc::new(SchemaDecoder),
            fee_classifier: Arc::new(FailingFeeClassifier),
            expiration_calculator: Arc::new(BlockAgeExpirationCalculator),
            config_manager: Arc::new(StaticConfigManager {
                block_time: 10,
                network_pubkey_hash: 0x17,
            }),
            slots: Arc::new(FixedSlots { now: 1_000 }),
            config: PoolConfig::default(),
        };
        let tx = sample_transaction("tx_a", "transfer", 10_000, 1_000);

        let report = Processor::new(&deps).validate(vec![tx.clone()]).await;

        assert_eq!(report.errors[&tx.id][0].kind, "ERR_APPLY");
        assert!(report.invalid.contains(&tx.id));
    }

    #[tokio::test]
    async fn s8_wrong_network_is_rejected() {
        let h = harness(accept_and_broadcast(), 1_000, &[]);
        let mut tx = sample_transaction("tx_a", "transfer", 10_000, 1_000);
        tx.network = Some(0x00);

        let report = Processor::new(&h.deps).validate(vec![tx.clone()]).await;

        assert_eq!(report.errors[&tx.id][0].kind, "ERR_WRONG_NETWORK");
    }

    #[tokio::test]
    async fn property_partition_holds_across_a_mixed_batch() {
        let h = harness(accept_and_broadcast(), 1_000, &["unsupported_kind"]);
        let good = sample_transaction("good", "transfer", 10_000, 1_000);
        let bad = sample_transaction("bad", "unsupported_kind", 10_000, 1_000);
        let quota = sample_transaction("quota", "transfer", 10_000, 1_000);
        h.pool.mark_quota_exceeded(&quota.sender_public_key);

        let report = Processor::new(&h.deps)
            .validate(vec![good.clone(), bad.clone(), quota.clone()])
            .await;

        let all: StdHashSet<TransactionId> = report
            .accept
            .iter()
            .chain(report.broadcast.iter())
            .chain(report.excess.iter())
            .chain(report.invalid.iter())
            .cloned()
            .collect();
        let expected: StdHashSet<TransactionId> = [good.id, bad.id.clone(), quota.id].into_iter().collect();
        assert_eq!(all, expected);

        let excess_and_invalid: StdHashSet<&TransactionId> =
            report.excess.iter().chain(report.invalid.iter()).collect();
        assert_eq!(excess_and_invalid.len(), report.excess.len() + report.invalid.len());

        assert!(report.invalid.contains(&bad.id));
        assert!(report.errors.contains_key(&bad.id));
    }

    #[tokio::test]
    async fn property_order_preservation() {
        let h = harness(accept_and_broadcast(), 1_000, &[]);
        let a = sample_transaction("a", "transfer", 10_000, 1_000);
        let b = sample_transaction("b", "transfer", 10_000, 1_000);
        let c = sample_transaction("c", "transfer", 10_000, 1_000);

        let report = Processor::new(&h.deps)
            .validate(vec![a.clone(), b.clone(), c.clone()])
            .await;

        assert_eq!(report.accept, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn property_idempotent_rejection_under_identical_clock_and_config() {
        let run = |now: u32| async move {
            let h = harness(
                FeeClassification {
                    enter_pool: false,
                    broadcast: false,
                },
                now,
                &[],
            );
            let tx = sample_transaction("tx_a", "transfer", 1, 1_000);
            Processor::new(&h.deps).validate(vec![tx]).await
        };

        let first = run(1_000).await;
        let second = run(1_000).await;
        assert_eq!(first, second);
    }
}
