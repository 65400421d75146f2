//! The transaction admission processor: the gatekeeper between an untrusted
//! ingress and the authoritative mempool.
//!
//! A [`Processor`] is constructed per batch from a borrowed [`ProcessorDeps`]
//! and consumed by [`Processor::validate`], which runs the fixed pipeline
//! (dedup, structural/temporal gates, handler dispatch, signature
//! verification, fee classification, forged-history reconciliation,
//! pool-insertion reconciliation) and returns a [`Report`].

pub mod component;
pub mod config;
pub mod consensus;
pub mod decode;
pub mod error;
pub mod expiration;
pub mod fee;
pub mod forged;
pub mod handler;
pub mod pool;
pub mod processor;
pub mod signature;
pub mod state_store;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::PoolConfig;
pub use error::{Reject, RejectEntry};
pub use processor::{Processor, ProcessorDeps};
pub use types::{DecodedTransaction, Report, Transaction, TransactionId};
