//! Generic error taxonomy shared by the admission pipeline crates.
//!
//! This mirrors the base/kind split of `ckb-error`: a fine-grained
//! [`ErrorKind`] classifies the failure, while [`Error`] carries the
//! underlying cause as an opaque, cheaply-cloneable [`AnyError`] so
//! collaborator crates don't need to know each other's concrete error types.

mod internal;
mod util;

use derive_more::Display;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use internal::{InternalError, InternalErrorKind, OtherError, SilentError};
pub use util::assert_error_eq;

/// An opaque, cloneable error used as the carrier inside [`Error`] and the
/// base-on-kind error types built with [`def_error_base_on_kind`].
///
/// Wraps `anyhow::Error` in an `Arc` so that `Error` (which embeds one of
/// these) can stay `Clone`, which the admission pipeline relies on when the
/// same rejection needs to be recorded for both a transaction id and a
/// batch-level log line.
#[derive(Clone)]
pub struct AnyError(Arc<anyhow::Error>);

impl AnyError {
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    pub fn chain(&self) -> anyhow::Chain<'_> {
        self.0.chain()
    }

    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        self.0.root_cause()
    }
}

impl<E> From<E> for AnyError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        AnyError(Arc::new(anyhow::Error::new(error)))
    }
}

impl fmt::Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A list specifying the general category of an error produced anywhere in
/// the admission pipeline.
///
/// This list is intended to grow over time; it is not recommended to
/// exhaustively match against it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum ErrorKind {
    /// The error originates from validating a single transaction.
    Transaction,
    /// The error originates from the admission pipeline itself (decode,
    /// handler resolution, fee classification, ...).
    Pool,
    /// An internal error not tied to a single transaction.
    Internal,
}

def_error_base_on_kind!(Error, ErrorKind, "The top-level error type.");
