//! Transaction Module
//!
//! Deferred execution inside `MULTI`/`EXEC`.
//!
//! ## Flow
//! ```text
//! [WATCH k...]          (optional)
//! MULTI
//!   op 1 ──▶ queue decoder[0] ──▶ send ──▶ QUEUED?
//!   op 2 ──▶ queue decoder[1] ──▶ send ──▶ QUEUED?
//!   ...
//! EXEC  ──▶ [reply 0, reply 1, ...] ──▶ decoder[i](reply i)
//! ```
//!
//! - A rejected enqueue flips the transaction to discarded; commit then sends
//!   `DISCARD` and returns an empty, discarded result.
//! - An error reply inside the `EXEC` array fails only that slot.
//! - Concurrent calls into one transaction are not supported; the queue is
//!   positional and callers must serialize operations.

mod result;
mod state;

pub use result::{OptimisticLockingTransactionResult, TransactionResult};
pub use state::{TransactionState, Transactional};
