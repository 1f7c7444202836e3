//! Transaction results
//!
//! Returned by `EXEC`. A discarded transaction is reported here as data,
//! never as an error.

use std::any::Any;
use std::fmt;

use crate::error::{RedisError, Result};

/// Outcome of a transaction
pub struct TransactionResult {
    discarded: bool,
    values: Vec<Result<Box<dyn Any + Send>>>,
}

impl TransactionResult {
    /// A discarded transaction: no values were decoded
    pub fn discarded() -> Self {
        Self {
            discarded: true,
            values: Vec::new(),
        }
    }

    pub(crate) fn committed(values: Vec<Result<Box<dyn Any + Send>>>) -> Self {
        Self {
            discarded: false,
            values,
        }
    }

    /// Whether the transaction was discarded (enqueue rejected, DISCARD, or a watched key changed)
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Whether any individual command failed inside a committed transaction
    pub fn has_errors(&self) -> bool {
        self.values.iter().any(|v| v.is_err())
    }

    /// Number of decoded results (one per queued command)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed result of the `index`-th queued command
    ///
    /// `None` when out of range, failed, or not a `T`.
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.values
            .get(index)?
            .as_ref()
            .ok()?
            .downcast_ref::<T>()
    }

    /// Error of the `index`-th queued command, if it failed
    pub fn error(&self, index: usize) -> Option<&RedisError> {
        self.values.get(index)?.as_ref().err()
    }

    /// Take ownership of the `index`-th result
    ///
    /// Fails with the command's own error, or a decoding error when the
    /// result is not a `T`. The slot is left as an `IllegalState` error.
    pub fn take<T: 'static>(&mut self, index: usize) -> Result<T> {
        let slot = self.values.get_mut(index).ok_or_else(|| {
            RedisError::IllegalState(format!("no transaction result at index {}", index))
        })?;
        let taken = std::mem::replace(
            slot,
            Err(RedisError::IllegalState(format!("result {} already taken", index))),
        )?;
        match taken.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(other) => {
                *slot = Ok(other);
                Err(RedisError::Decoding(format!(
                    "result {} is not a `{}`",
                    index,
                    std::any::type_name::<T>()
                )))
            }
        }
    }
}

impl fmt::Debug for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionResult")
            .field("discarded", &self.discarded)
            .field("len", &self.values.len())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}

/// A transaction result plus the value produced before `MULTI` while the
/// watched keys were held
pub struct OptimisticLockingTransactionResult<I> {
    pre_transaction_result: I,
    result: TransactionResult,
}

impl<I> OptimisticLockingTransactionResult<I> {
    pub(crate) fn new(pre_transaction_result: I, result: TransactionResult) -> Self {
        Self {
            pre_transaction_result,
            result,
        }
    }

    pub fn pre_transaction_result(&self) -> &I {
        &self.pre_transaction_result
    }

    pub fn result(&self) -> &TransactionResult {
        &self.result
    }

    pub fn is_discarded(&self) -> bool {
        self.result.is_discarded()
    }

    pub fn into_parts(self) -> (I, TransactionResult) {
        (self.pre_transaction_result, self.result)
    }
}

impl<I: fmt::Debug> fmt::Debug for OptimisticLockingTransactionResult<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimisticLockingTransactionResult")
            .field("pre_transaction_result", &self.pre_transaction_result)
            .field("result", &self.result)
            .finish()
    }
}
