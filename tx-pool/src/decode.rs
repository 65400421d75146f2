//! The wire-decoding and schema-validation boundary (§4.2 step 5).
//!
//! Out of scope per §1: the processor only ever sees this trait, never a
//! concrete wire format. A schema failure maps to `ERR_TRANSACTION_SCHEMA`;
//! any other decoding failure is normalised to `ERR_UNKNOWN`.

use chain_error::Error as InnerError;
use thiserror::Error;

use crate::types::Transaction;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("schema validation failed: {0}")]
    Schema(String),
    #[error("{0}")]
    Other(InnerError),
}

/// Rebuilds a validated, typed transaction from the opaque input form.
pub trait Decoder: Send + Sync {
    fn decode(&self, tx: &Transaction) -> Result<Transaction, DecodeError>;
}

/// A minimal reference decoder: requires a non-empty payload and a
/// recognised `kind` string. Enough to exercise the schema-error path in
/// tests without a real wire format.
pub struct SchemaDecoder;

impl Decoder for SchemaDecoder {
    fn decode(&self, tx: &Transaction) -> Result<Transaction, DecodeError> {
        if tx.serialized_bytes.is_empty() {
            return Err(DecodeError::Schema("empty payload".to_owned()));
        }
        if tx.kind.is_empty() {
            return Err(DecodeError::Schema("missing transaction type".to_owned()));
        }
        Ok(tx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionId;

    fn base_tx() -> Transaction {
        Transaction {
            id: TransactionId::from("id"),
            sender_public_key: String::new(),
            kind: "transfer".into(),
            type_group: 1,
            network: None,
            timestamp: 0,
            fee: 1,
            nonce: None,
            serialized_bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn empty_payload_is_a_schema_error() {
        let decoder = SchemaDecoder;
        let mut tx = base_tx();
        tx.serialized_bytes.clear();
        assert!(matches!(decoder.decode(&tx), Err(DecodeError::Schema(_))));
    }

    #[test]
    fn well_formed_transaction_decodes() {
        let decoder = SchemaDecoder;
        let tx = base_tx();
        assert!(decoder.decode(&tx).is_ok());
    }
}
