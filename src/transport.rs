//! Transport boundary
//!
//! The only door to the network. Connection handling, pooling, reconnection
//! and RESP framing all live behind it.

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{Command, Reply};

/// Executes one command and returns its decoded reply tree
///
/// Implementations must support concurrent independent calls; each call is a
/// separate round trip. Transactions and cursors issue their commands through
/// one `Transport` sequentially, so a transport used for `MULTI`/`EXEC` must
/// keep those on a single connection.
///
/// Failures (I/O, protocol) are returned as-is; this crate adds no retries.
/// A server error reply is returned as `Ok(Reply::Error(..))`, not `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, command: Command) -> Result<Reply>;
}
