//! C2 + the type-support clause of §4.3: structural/temporal checks and
//! handler resolution, in the order the spec fixes them.

use std::sync::Arc;

use crate::consensus::Milestone;
use crate::error::Reject;
use crate::expiration::{ExpirationCalculator, ExpirationContext};
use crate::handler::{ErrorSink, Handler, HandlerRegistry, HandlerResolutionError};
use crate::pool::Pool;
use crate::types::Transaction;

/// The result of running the semantic gate on one transaction.
pub enum GateOutcome {
    /// All four checks passed; carries the resolved handler for the
    /// remaining steps of §4.2 (decode, verify, fee-classify).
    Pass(Arc<dyn Handler>),
    /// The gate itself produced a rejection reason.
    Rejected(Reject),
    /// The handler rejected the transaction and already recorded its own
    /// error via [`ErrorSink`] (§9 "back-references to self").
    RejectedByHandler,
}

/// Inputs read once per transaction, taken as a snapshot (§5: the batch sees
/// a single consistent `current_height` per transaction).
pub struct GateContext<'a> {
    pub now: u32,
    pub current_height: u32,
    pub max_future_seconds: u32,
    pub max_transaction_age: u32,
    pub milestone: Milestone,
    pub network_pubkey_hash: u8,
    pub expiration_calculator: &'a dyn ExpirationCalculator,
    pub handler_registry: &'a dyn HandlerRegistry,
}

pub fn check(
    tx: &Transaction,
    ctx: &GateContext<'_>,
    pool: &dyn Pool,
    errors: &mut dyn ErrorSink,
) -> GateOutcome {
    if let Some(delta) = future_timestamp_delta(tx, ctx) {
        return GateOutcome::Rejected(Reject::FromFuture {
            id: tx.id.to_string(),
            delta,
        });
    }

    if let Some(blocks) = expired_blocks(tx, ctx) {
        return GateOutcome::Rejected(Reject::Expired {
            id: tx.id.to_string(),
            blocks,
        });
    }

    if let Some(network) = tx.network {
        if network != ctx.network_pubkey_hash {
            return GateOutcome::Rejected(Reject::WrongNetwork);
        }
    }

    let handler = match ctx.handler_registry.get(tx) {
        Ok(handler) => handler,
        Err(HandlerResolutionError::Unsupported(invalid)) => {
            return GateOutcome::Rejected(Reject::Unsupported(invalid.0))
        }
        Err(HandlerResolutionError::Other(cause)) => {
            return GateOutcome::Rejected(Reject::Unknown(cause))
        }
    };

    if handler.can_enter_transaction_pool(tx, pool, errors) {
        GateOutcome::Pass(handler)
    } else {
        GateOutcome::RejectedByHandler
    }
}

fn future_timestamp_delta(tx: &Transaction, ctx: &GateContext<'_>) -> Option<u32> {
    let horizon = ctx.now.saturating_add(ctx.max_future_seconds);
    if tx.timestamp > horizon {
        Some(tx.timestamp - horizon)
    } else {
        None
    }
}

fn expired_blocks(tx: &Transaction, ctx: &GateContext<'_>) -> Option<u32> {
    let expiration_ctx = ExpirationContext {
        block_time: ctx.milestone.block_time,
        current_height: ctx.current_height,
        now: ctx.now,
        max_transaction_age: ctx.max_transaction_age,
    };
    let expiration = ctx.expiration_calculator.expiration_height(tx, &expiration_ctx)?;
    if expiration <= ctx.current_height + 1 {
        Some(ctx.current_height.saturating_sub(expiration))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiration::BlockAgeExpirationCalculator;
    use crate::handler::InvalidTransactionType;
    use crate::types::TransactionId;

    struct AllowAllRegistry;
    impl HandlerRegistry for AllowAllRegistry {
        fn get(&self, _tx: &Transaction) -> Result<Arc<dyn Handler>, HandlerResolutionError> {
            Err(InvalidTransactionType("mystery".into()).into())
        }
    }

    fn base_tx() -> Transaction {
        Transaction {
            id: TransactionId::from("id"),
            sender_public_key: String::new(),
            kind: "transfer".into(),
            type_group: 1,
            network: None,
            timestamp: 1_000,
            fee: 1,
            nonce: None,
            serialized_bytes: Vec::new(),
        }
    }

    struct NullSink;
    impl ErrorSink for NullSink {
        fn push_error(&mut self, _id: &TransactionId, _reject: Reject) {}
    }

    #[test]
    fn future_timestamp_beyond_skew_is_rejected() {
        let calc = BlockAgeExpirationCalculator;
        let registry = AllowAllRegistry;
        let mut tx = base_tx();
        tx.timestamp = 1_000 + 3_601;
        let ctx = GateContext {
            now: 1_000,
            current_height: 10,
            max_future_seconds: 3_600,
            max_transaction_age: 0,
            milestone: Milestone { block_time: 10 },
            network_pubkey_hash: 0x17,
            expiration_calculator: &calc,
            handler_registry: &registry,
        };
        let dummy_pool = crate::test_support::InMemoryPool::default();
        let mut sink = NullSink;
        match check(&tx, &ctx, &dummy_pool, &mut sink) {
            GateOutcome::Rejected(Reject::FromFuture { delta, .. }) => assert_eq!(delta, 1),
            _ => panic!("expected FromFuture rejection"),
        }
    }

    #[test]
    fn wrong_network_is_rejected() {
        let calc = BlockAgeExpirationCalculator;
        let registry = AllowAllRegistry;
        let mut tx = base_tx();
        tx.network = Some(0x00);
        let ctx = GateContext {
            now: 1_000,
            current_height: 10,
            max_future_seconds: 3_600,
            max_transaction_age: 0,
            milestone: Milestone { block_time: 10 },
            network_pubkey_hash: 0x17,
            expiration_calculator: &calc,
            handler_registry: &registry,
        };
        let dummy_pool = crate::test_support::InMemoryPool::default();
        let mut sink = NullSink;
        assert!(matches!(
            check(&tx, &ctx, &dummy_pool, &mut sink),
            GateOutcome::Rejected(Reject::WrongNetwork)
        ));
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let calc = BlockAgeExpirationCalculator;
        let registry = AllowAllRegistry;
        let tx = base_tx();
        let ctx = GateContext {
            now: 1_000,
            current_height: 10,
            max_future_seconds: 3_600,
            max_transaction_age: 0,
            milestone: Milestone { block_time: 10 },
            network_pubkey_hash: 0x17,
            expiration_calculator: &calc,
            handler_registry: &registry,
        };
        let dummy_pool = crate::test_support::InMemoryPool::default();
        let mut sink = NullSink;
        assert!(matches!(
            check(&tx, &ctx, &dummy_pool, &mut sink),
            GateOutcome::Rejected(Reject::Unsupported(_))
        ));
    }
}
