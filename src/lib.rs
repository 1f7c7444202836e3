//! # redisx
//!
//! Typed command/response marshalling for Redis-protocol stores, with:
//! - Codec registry resolved once per command group
//! - Direct and transactional (`MULTI`/`EXEC`) execution from the same code
//! - Restartable-per-call scan cursors exposed as lazy streams
//! - A blocking facade with bounded waits
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 DataSource / BlockingDataSource             │
//! │           (command groups, transactions, cursors)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ validate + encode (Marshaller slots)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Command + Decoder                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌───────────────┐
//!   │   Direct    │          │ Transactional │
//!   │ decode now  │          │ queue decoder │
//!   └──────┬──────┘          └───────┬───────┘
//!          │                         │
//!          └────────────┬────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │  Transport   │
//!               │ (external)   │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod codec;
pub mod marshaller;
pub mod transport;
pub mod executor;
pub mod transaction;
pub mod cursor;
pub mod commands;
pub mod datasource;
pub mod blocking;
pub mod validation;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RedisError, Result};
pub use config::Config;
pub use codec::{Codec, Codecs};
pub use protocol::{Args, Command, Reply};
pub use transport::Transport;
pub use executor::{Direct, Executor, RedisFuture, Request};
pub use transaction::{OptimisticLockingTransactionResult, TransactionResult, Transactional};
pub use cursor::Cursor;
pub use datasource::{DataSource, TransactionalDataSource};
pub use blocking::BlockingDataSource;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of redisx
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
